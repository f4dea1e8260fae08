use crate::app::AppContext;

pub fn handle_journals(ctx: &AppContext, json: bool, no_input: bool) -> anyhow::Result<()> {
    let client = ctx.login(no_input)?;
    let journals = client.journals()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&journals)?);
    } else {
        for name in &journals {
            println!("{}", name);
        }
    }
    Ok(())
}

pub fn handle_create_journal(ctx: &AppContext, name: &str, no_input: bool) -> anyhow::Result<()> {
    let client = ctx.login(no_input)?;
    client.create_journal(name)?;
    if !ctx.quiet() {
        println!("Created journal \"{}\"", name.trim());
    }
    Ok(())
}
