//! Web server command.

use console::style;

use crate::config::Settings;

pub async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or(&settings.bind_address);
    let (host, port) = parse_bind_address(bind)?;

    println!("{} Running database migrations...", style("→").cyan());
    let pool = crate::repository::DieselSqlitePool::new(settings.database_url.clone());
    pool.run_migrations()?;
    println!("  {} Database ready", style("✓").green());

    println!("{} Starting lka server at http://{}:{}", style("→").cyan(), host, port);
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be: just a port, just a host, or `host:port`.
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }
    Ok((bind.to_string(), 3030))
}
