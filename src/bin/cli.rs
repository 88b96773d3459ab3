use capacity_planner::{
    DragMode, DragState, Plan, export_resource_load_csv, export_utilization_csv,
    load::utilization_rows, load_plan_from_json, save_plan_to_json,
};
use std::io::{self, Write};
use std::str::FromStr;

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_tasks(plan: &Plan) -> String {
    let rows: Vec<Vec<String>> = plan
        .flattened_tasks()
        .into_iter()
        .map(|(depth, task)| {
            vec![
                format!("{}{}", "  ".repeat(depth), task.id),
                task.name.clone(),
                task.start.to_string(),
                task.end.to_string(),
                task.duration_days().to_string(),
                task.status.map(|s| s.as_str()).unwrap_or("-").to_string(),
            ]
        })
        .collect();
    render_text_table(&["id", "name", "start", "end", "days", "status"], &rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  show                                   Show plan window and task tree\n  tasks                                  Show task tree\n  demo                                   Replace the plan with the demo plan\n  load json <path>                       Load plan from disk\n  save json <path>                       Persist plan to disk\n  load-report [resource_id]              Per-resource daily load\n  util                                   Plan-wide daily utilization\n  overloads                              Resource days above their parallel limit\n  summary                                One-line utilization summary\n  normalize <assignment_id>              Sort and merge an assignment's fragments\n  drag begin <task_id> <move|resize-start|resize-end>\n                                         Start a drag gesture\n  drag update <days>                     Request a cumulative day delta\n  drag end                               Finish the gesture\n  move <task_id> <days>                  Clamped one-shot move\n  export <load|util> <path>              Write a CSV report\n  quit|exit                              Exit"
    );
}

fn print_plan(plan: &Plan) {
    let config = plan.config();
    println!(
        "Plan window        : {} .. {} ({} days)",
        config.plan_start,
        config.plan_end,
        plan.day_index().len()
    );
    println!("Default hours/day  : {}", config.hours_per_day_default);
    println!("Resources          : {}", plan.resources().len());
    println!("Assignments        : {}", plan.assignments().len());
    println!("{}", render_tasks(plan));
}

fn print_task_dates(plan: &Plan, task_id: &str, drag: &DragState) {
    if let Some(task) = plan.find_task(task_id) {
        let applied = drag
            .active()
            .map(|active| format!(" (applied {})", active.applied_delta))
            .unwrap_or_default();
        println!("Task {}: {} -> {}{}", task.id, task.start, task.end, applied);
    }
}

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let mut plan = match Plan::demo() {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Demo plan is invalid: {}", e);
            return;
        }
    };
    let mut drag = DragState::Idle;

    println!("Capacity Planner (CLI) - type 'help' for commands\n");
    print_plan(&plan);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_plan(&plan),
            "tasks" => println!("{}", render_tasks(&plan)),
            "demo" => match Plan::demo() {
                Ok(loaded) => {
                    plan = loaded;
                    drag = DragState::Idle;
                    println!("Demo plan loaded.");
                    print_plan(&plan);
                }
                Err(e) => println!("Error loading demo plan: {}", e),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match load_plan_from_json(path) {
                    Ok(loaded) => {
                        plan = loaded;
                        drag = DragState::Idle;
                        println!("Plan loaded from {}.", path);
                        print_plan(&plan);
                    }
                    Err(e) => println!("Error loading plan: {}", e),
                },
                _ => println!("Usage: load json <path>"),
            },
            "save" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match save_plan_to_json(&plan, path) {
                    Ok(_) => println!("Plan saved to {}.", path),
                    Err(e) => println!("Error saving plan: {}", e),
                },
                _ => println!("Usage: save json <path>"),
            },
            "load-report" => {
                let only = parts.next();
                let rows: Vec<Vec<String>> = plan
                    .resource_load()
                    .into_iter()
                    .filter(|(resource_id, _)| only.is_none_or(|id| id == resource_id.as_str()))
                    .flat_map(|(resource_id, cells)| {
                        cells.into_iter().map(move |(date, cell)| {
                            vec![
                                resource_id.clone(),
                                date.to_string(),
                                format!("{:.2}", cell.used_hours),
                                format!("{:.0}", cell.used_pct),
                            ]
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    render_text_table(&["resource", "date", "used_hours", "used_pct"], &rows)
                );
            }
            "util" => {
                let rows: Vec<Vec<String>> = utilization_rows(&plan)
                    .into_iter()
                    .map(|row| {
                        vec![
                            row.date.to_string(),
                            format!("{:.2}", row.capacity_hours),
                            format!("{:.2}", row.used_hours),
                            format!("{:.1}%", row.ratio * 100.0),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    render_text_table(&["date", "capacity", "used", "utilization"], &rows)
                );
            }
            "overloads" => {
                let overloads = plan.overloads();
                if overloads.is_empty() {
                    println!("No overloaded resource days.");
                    continue;
                }
                let rows: Vec<Vec<String>> = overloads
                    .into_iter()
                    .map(|o| {
                        vec![
                            o.resource_id,
                            o.date.to_string(),
                            format!("{:.0}", o.used_pct),
                            format!("{:.0}", o.limit_pct),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    render_text_table(&["resource", "date", "used_pct", "limit_pct"], &rows)
                );
            }
            "summary" => println!("Utilization ({})", plan.summary().to_cli_summary()),
            "normalize" => match parts.next() {
                Some(id) => match plan.normalize_assignment(id) {
                    Some(next) => {
                        let count = next
                            .find_assignment(id)
                            .map(|a| a.fragments.len())
                            .unwrap_or_default();
                        plan = next;
                        println!("Assignment {} normalized ({} fragments).", id, count);
                    }
                    None => println!("Assignment {} not found.", id),
                },
                None => println!("Usage: normalize <assignment_id>"),
            },
            "drag" => match parts.next() {
                Some("begin") => {
                    let id = parts.next();
                    let mode = parts.next().map(DragMode::from_str);
                    match (id, mode) {
                        (Some(id), Some(Ok(mode))) => {
                            if drag.is_active() {
                                println!("A drag gesture is already active.");
                                continue;
                            }
                            drag = std::mem::take(&mut drag).begin(&plan, id, mode);
                            if drag.is_active() {
                                println!("Drag started on {} ({}).", id, mode);
                            } else {
                                println!("Task {} not found.", id);
                            }
                        }
                        (Some(_), Some(Err(e))) => println!("{}", e),
                        _ => println!("Usage: drag begin <task_id> <move|resize-start|resize-end>"),
                    }
                }
                Some("update") => match parts.next().map(i64::from_str) {
                    Some(Ok(days)) => {
                        let Some(task_id) = drag.active().map(|a| a.task_id.clone()) else {
                            println!("No drag gesture is active.");
                            continue;
                        };
                        let (next_drag, next_plan) = std::mem::take(&mut drag).update(&plan, days);
                        drag = next_drag;
                        plan = next_plan;
                        print_task_dates(&plan, &task_id, &drag);
                    }
                    _ => println!("Usage: drag update <days>"),
                },
                Some("end") => {
                    drag = std::mem::take(&mut drag).end();
                    println!("Drag ended.");
                }
                _ => println!("Usage: drag begin|update|end ..."),
            },
            "move" => match (parts.next(), parts.next().map(i64::from_str)) {
                (Some(id), Some(Ok(days))) => {
                    if plan.find_task(id).is_none() {
                        println!("Task {} not found.", id);
                        continue;
                    }
                    plan = plan.move_task_by_days(id, days);
                    print_task_dates(&plan, id, &DragState::Idle);
                }
                _ => println!("Usage: move <task_id> <days>"),
            },
            "export" => match (parts.next(), parts.next()) {
                (Some("load"), Some(path)) => match export_resource_load_csv(&plan, path) {
                    Ok(_) => println!("Resource load exported to {}.", path),
                    Err(e) => println!("Error exporting: {}", e),
                },
                (Some("util"), Some(path)) => match export_utilization_csv(&plan, path) {
                    Ok(_) => println!("Utilization exported to {}.", path),
                    Err(e) => println!("Error exporting: {}", e),
                },
                _ => println!("Usage: export <load|util> <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
