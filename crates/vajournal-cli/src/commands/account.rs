use vajournal_core::storage::DEFAULT_JOURNAL;

use crate::app::{read_new_password, resolve_config_path, AppContext};
use crate::cli::RegisterArgs;
use crate::config::{read_config, write_config};

pub fn handle_register(ctx: &AppContext, args: &RegisterArgs) -> anyhow::Result<()> {
    let username = match args.username.as_deref() {
        Some(name) => name.trim().to_string(),
        None => ctx.username()?,
    };

    let mut client = ctx.client()?;
    let password = read_new_password(ctx.interactive(args.no_input))?;
    let user = client.register(&username, password)?;
    client.logout();

    remember_account(&user.username)?;

    if !ctx.quiet() {
        println!(
            "Registered {}. Journal \"{}\" is ready.",
            user.username, DEFAULT_JOURNAL
        );
    }
    Ok(())
}

/// Make the first registered account the config default.
fn remember_account(username: &str) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if !config_path.exists() {
        return Ok(());
    }
    let mut config = read_config(&config_path)?;
    if config.account.username.is_none() {
        config.account.username = Some(username.to_string());
        write_config(&config_path, &config)?;
    }
    Ok(())
}
