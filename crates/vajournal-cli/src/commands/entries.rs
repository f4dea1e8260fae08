use std::path::{Path, PathBuf};

use chrono::Utc;
use vajournal_core::storage::{EntryFilter, EntryKind};
use zeroize::Zeroize;

use crate::app::{AppContext, DEFAULT_JOURNAL_HINT};
use crate::cli::{AttachArgs, ReadArgs, WriteArgs};
use crate::errors::CliError;
use crate::helpers::{media_extension, parse_datetime, parse_duration, parse_kind, read_entry_body};
use crate::output::{entry_heading, entry_json, print_warning, stdout_color, unreadable_json};

pub fn handle_write(ctx: &AppContext, args: &WriteArgs) -> anyhow::Result<()> {
    let journal = ctx.journal_or_default(args.journal.as_deref())?;
    let created_at = args.date.as_deref().map(parse_datetime).transpose()?;

    let mut body = read_entry_body(args.no_input, args.body.clone(), ctx.editor()?)?;
    let client = ctx.login(args.no_input)?;
    let result = client.write_entry(&journal, EntryKind::Text, body.as_bytes(), created_at);
    body.zeroize();
    let id = result?;

    if !ctx.quiet() {
        println!("Saved entry {} to \"{}\"", id, journal);
    }
    Ok(())
}

pub fn handle_attach(ctx: &AppContext, args: &AttachArgs) -> anyhow::Result<()> {
    let kind = parse_kind(&args.kind)?;
    if kind == EntryKind::Text {
        return Err(CliError::invalid_input(
            "Use `vajournal write` for text entries; attach takes drawing or audio",
        )
        .into());
    }
    let journal = ctx.journal_or_default(args.journal.as_deref())?;
    let created_at = args.date.as_deref().map(parse_datetime).transpose()?;

    let path = Path::new(&args.file);
    let mut data = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => anyhow::Error::from(CliError::not_found(
            format!("File not found: {}", path.display()),
            "Check the path and try again.",
        )),
        _ => anyhow::anyhow!("Failed to read {}: {}", path.display(), e),
    })?;
    if data.is_empty() {
        return Err(CliError::invalid_input(format!("{} is empty", path.display())).into());
    }

    let client = ctx.login(args.no_input)?;
    let result = client.write_entry(&journal, kind, &data, created_at);
    let size = data.len();
    data.zeroize();
    let id = result?;

    if !ctx.quiet() {
        println!(
            "Saved {} entry {} ({} bytes) to \"{}\"",
            kind, id, size, journal
        );
    }
    Ok(())
}

fn build_filter(args: &ReadArgs) -> anyhow::Result<EntryFilter> {
    let mut filter = EntryFilter::new();
    if let Some(kind) = args.kind.as_deref() {
        filter = filter.kind(parse_kind(kind)?);
    }
    if let Some(last) = args.last.as_deref() {
        if args.since.is_some() {
            return Err(CliError::invalid_input("Use either --last or --since, not both").into());
        }
        let since = Utc::now()
            .checked_sub_signed(parse_duration(last)?)
            .ok_or_else(|| CliError::invalid_input(format!("--last {} reaches too far back", last)))?;
        filter = filter.since(since);
    }
    if let Some(since) = args.since.as_deref() {
        filter = filter.since(parse_datetime(since)?);
    }
    if let Some(until) = args.until.as_deref() {
        filter = filter.until(parse_datetime(until)?);
    }
    if let Some(limit) = args.limit {
        if limit == 0 {
            return Err(CliError::invalid_input("--limit must be at least 1").into());
        }
        filter = filter.limit(limit);
    }
    Ok(filter)
}

pub fn handle_read(ctx: &AppContext, args: &ReadArgs) -> anyhow::Result<()> {
    let journal = ctx.journal_or_default(args.journal.as_deref())?;
    let filter = build_filter(args)?;
    let out_dir = args.out.as_deref().map(PathBuf::from);

    let client = ctx.login(args.no_input)?;
    let batch = client.read(&journal, &filter).map_err(|err| match err {
        vajournal_core::JournalError::NotFound(message) => {
            anyhow::Error::from(CliError::not_found(message, DEFAULT_JOURNAL_HINT))
        }
        other => anyhow::Error::from(other),
    })?;

    for unreadable in &batch.unreadable {
        print_warning(&format!(
            "entry {} could not be read ({})",
            unreadable.id, unreadable.reason
        ));
    }

    if let Some(dir) = out_dir.as_deref() {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", dir.display(), e))?;
    }

    if args.json {
        let value = serde_json::json!({
            "journal": journal,
            "entries": batch.entries.iter().map(entry_json).collect::<Vec<_>>(),
            "unreadable": batch.unreadable.iter().map(unreadable_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        if let Some(dir) = out_dir.as_deref() {
            for entry in batch.entries.iter().filter(|e| e.kind != EntryKind::Text) {
                save_media(dir, entry)?;
            }
        }
        return Ok(());
    }

    if batch.entries.is_empty() {
        if !ctx.quiet() && batch.unreadable.is_empty() {
            println!("No entries in \"{}\"", journal);
        }
        return Ok(());
    }

    let color = stdout_color();
    for (index, entry) in batch.entries.iter().enumerate() {
        if index > 0 {
            println!();
        }
        if !ctx.quiet() {
            println!("{}", entry_heading(entry, color));
        }
        match (entry.kind, entry.as_text()) {
            (EntryKind::Text, Some(text)) => println!("{}", text),
            _ => match out_dir.as_deref() {
                Some(dir) => {
                    let path = save_media(dir, entry)?;
                    println!("[{} saved to {}]", entry.kind, path.display());
                }
                None => println!(
                    "[{}, {} bytes; use --out DIR to save]",
                    entry.kind,
                    entry.plaintext.len()
                ),
            },
        }
    }
    Ok(())
}

fn save_media(dir: &Path, entry: &vajournal_core::DecryptedEntry) -> anyhow::Result<PathBuf> {
    let ext = media_extension(entry.kind, &entry.plaintext);
    let path = dir.join(format!("{}.{}", entry.id, ext));
    std::fs::write(&path, &entry.plaintext)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    Ok(path)
}
