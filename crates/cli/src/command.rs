use crate::context::CoreContext;

pub enum Flow {
    Continue,
    Quit,
}

/// Executes one line of the §6 command language against `ctx`, printing its
/// reply to stdout. Unrecognized or malformed commands print an error line
/// but never abort the loop (only `Q` does).
pub fn dispatch(line: &str, ctx: &CoreContext) -> Flow {
    let mut parts = line.trim().splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    match cmd {
        "" => {}
        "S" => match ctx.open(rest, 1, false, false) {
            Ok(()) => println!("ok"),
            Err(err) => println!("error: {err}"),
        },
        "j" => print_nav_result(ctx, |b| b.jump(rest)),
        "n" => print_current(ctx, |b| b.next()),
        "p" => print_current(ctx, |b| b.prev()),
        "nn" => print_current(ctx, |b| b.next_folder()),
        "pp" => print_current(ctx, |b| b.prev_folder()),
        "gf" => print_current(ctx, |b| b.go_first()),
        "gl" => print_current(ctx, |b| b.go_last()),
        "gt" => print_current(ctx, |b| b.go_top()),
        "ge" => print_current(ctx, |b| b.go_end()),
        "A" => print_current(ctx, |b| {
            b.toggle_pages();
            b.get_current()
        }),
        "T" => print_current(ctx, |b| {
            b.toggle_shift();
            b.get_current()
        }),
        "l" => {
            let entries = ctx.manager.list_entries(rest);
            for entry in entries {
                println!("{}\t{:?}\t{}", entry.rel_path, entry.entry_type, entry.size);
            }
        }
        "lf" => {
            let folder = ctx
                .with_browser(|b| {
                    b.get_current()
                        .first()
                        .and_then(|p| paths::parent_of(p).map(str::to_string))
                        .unwrap_or_default()
                })
                .unwrap_or_default();
            for entry in ctx.manager.list_entries(&folder) {
                println!("{}\t{:?}\t{}", entry.rel_path, entry.entry_type, entry.size);
            }
        }
        "c" => print_current(ctx, |b| b.get_current()),
        "D" => println!("log level: {}", ctx.cycle_log_level()),
        "Q" => return Flow::Quit,
        other => println!("error: unrecognized command {other:?}"),
    }

    Flow::Continue
}

fn print_current(ctx: &CoreContext, f: impl FnOnce(&mut browse_core::Browser) -> Vec<String>) {
    match ctx.with_browser(f) {
        Some(heads) => {
            ctx.sync_pipeline(&heads);
            println!("{}", heads.join("\t"));
        }
        None => println!("error: no root is open"),
    }
}

fn print_nav_result(
    ctx: &CoreContext,
    f: impl FnOnce(&mut browse_core::Browser) -> types::Result<Vec<String>>,
) {
    match ctx.with_browser(f) {
        Some(Ok(heads)) => {
            ctx.sync_pipeline(&heads);
            println!("{}", heads.join("\t"));
        }
        Some(Err(err)) => println!("error: {err}"),
        None => println!("error: no root is open"),
    }
}
