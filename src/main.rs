use anyhow::Result;
use std::{
    env,
    io::{self, Write},
};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use zomato_eda::{config::Config, session::Session};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new("").add_directive(level.parse().unwrap_or(Level::INFO.into()))
    });
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::load()?;
    info!(data = %config.data_path.display(), "startup");
    let interactive = config.interactive;
    let table_rows = config.table_rows;
    let mut session = Session::new(config);

    // ─── 3) first render + exports ───────────────────────────────────
    let stdout = io::stdout();
    let mut out = stdout.lock();
    session.render(&mut out)?;
    session.render_table(&mut out, table_rows)?;
    session.export()?;
    out.flush()?;

    // ─── 4) one recomputation per command ────────────────────────────
    if interactive {
        session.run(io::stdin().lock(), &mut out)?;
    }

    info!("all done");
    Ok(())
}
