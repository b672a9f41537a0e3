//! Shared helper functions for CLI commands
//!
//! Workspace discovery, record reference resolution, and the small
//! formatting routines the table renderers share.

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::core::{Config, RecordId, Store, Workspace};
use chrono::{DateTime, NaiveDate, Utc};
use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use std::io::{self, Write};

/// Everything a command needs to read or mutate workspace records
pub struct CliContext {
    pub workspace: Workspace,
    pub config: Config,
    pub store: Store,
}

impl CliContext {
    /// The acting user id for journaled mutations
    pub fn user(&self) -> String {
        self.config.user()
    }
}

/// Discover the workspace, load config, and open the configured backend
pub fn open_store(global: &GlobalOpts) -> Result<CliContext> {
    let workspace = match &global.dir {
        Some(dir) => Workspace::discover_from(dir).into_diagnostic()?,
        None => Workspace::discover().into_diagnostic()?,
    };
    let config = Config::load(Some(&workspace));
    let backend = workspace.open_backend(config.storage()).into_diagnostic()?;
    let store = Store::open(backend).into_diagnostic()?;
    Ok(CliContext {
        workspace,
        config,
        store,
    })
}

/// Resolve the active project from --project, the config default, or the
/// sole project in the workspace
pub fn active_project(ctx: &CliContext, global: &GlobalOpts) -> Result<RecordId> {
    let reference = global
        .project
        .clone()
        .or_else(|| ctx.config.default_project.clone());
    match reference {
        Some(reference) => resolve_project(&ctx.store, &reference),
        None => match ctx.store.projects() {
            [only] => Ok(only.id.clone()),
            [] => Err(miette!(
                "No projects exist yet. Create one with 'sitedesk project new'."
            )),
            _ => Err(miette!(
                "No project selected. Pass --project or set default_project in config."
            )),
        },
    }
}

/// Resolve a project reference: exact id, exact name, or unique name prefix
pub fn resolve_project(store: &Store, reference: &str) -> Result<RecordId> {
    if let Ok(id) = RecordId::parse(reference) {
        if store.project(&id).is_ok() {
            return Ok(id);
        }
    }
    let lowered = reference.to_lowercase();
    if let Some(project) = store
        .projects()
        .iter()
        .find(|p| p.name.to_lowercase() == lowered)
    {
        return Ok(project.id.clone());
    }
    let matches: Vec<_> = store
        .projects()
        .iter()
        .filter(|p| p.name.to_lowercase().starts_with(&lowered))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(miette!("No project matches '{}'", reference)),
        _ => {
            let names: Vec<&str> = matches.iter().map(|p| p.name.as_str()).collect();
            Err(miette!(
                "'{}' matches more than one project: {}",
                reference,
                names.join(", ")
            ))
        }
    }
}

/// Resolve a task by display number within the project, or by record id
pub fn resolve_task(store: &Store, project_id: &RecordId, reference: &str) -> Result<RecordId> {
    let trimmed = reference.trim_start_matches('#');
    if let Ok(number) = trimmed.parse::<u32>() {
        if let Some(task) = store
            .project_tasks(project_id)
            .iter()
            .find(|t| t.task_number == number)
        {
            return Ok(task.id.clone());
        }
    }
    if let Ok(id) = RecordId::parse(reference) {
        if let Ok(task) = store.task(&id) {
            if &task.project_id == project_id {
                return Ok(id);
            }
        }
    }
    Err(miette!("No task matches '{}' in this project", reference))
}

/// Resolve an RFI by display number within the project, or by record id
pub fn resolve_rfi(store: &Store, project_id: &RecordId, reference: &str) -> Result<RecordId> {
    let trimmed = reference.trim_start_matches('#');
    if let Ok(number) = trimmed.parse::<u32>() {
        if let Some(rfi) = store
            .project_rfis(project_id)
            .iter()
            .find(|r| r.rfi_number == number)
        {
            return Ok(rfi.id.clone());
        }
    }
    if let Ok(id) = RecordId::parse(reference) {
        if let Ok(rfi) = store.rfi(&id) {
            if &rfi.project_id == project_id {
                return Ok(id);
            }
        }
    }
    Err(miette!("No RFI matches '{}' in this project", reference))
}

/// Resolve a submittal by display number within the project, or by record id
pub fn resolve_submittal(
    store: &Store,
    project_id: &RecordId,
    reference: &str,
) -> Result<RecordId> {
    let trimmed = reference.trim_start_matches('#');
    if let Ok(number) = trimmed.parse::<u32>() {
        if let Some(submittal) = store
            .project_submittals(project_id)
            .iter()
            .find(|s| s.submittal_number == number)
        {
            return Ok(submittal.id.clone());
        }
    }
    if let Ok(id) = RecordId::parse(reference) {
        if let Ok(submittal) = store.submittal(&id) {
            if &submittal.project_id == project_id {
                return Ok(id);
            }
        }
    }
    Err(miette!(
        "No submittal matches '{}' in this project",
        reference
    ))
}

/// Resolve a specification section by section number or record id
pub fn resolve_spec_section(
    store: &Store,
    project_id: &RecordId,
    reference: &str,
) -> Result<RecordId> {
    if let Some(spec) = store
        .project_specifications(project_id)
        .iter()
        .find(|s| s.number == reference)
    {
        return Ok(spec.id.clone());
    }
    if let Ok(id) = RecordId::parse(reference) {
        if let Ok(spec) = store.specification(&id) {
            if &spec.project_id == project_id {
                return Ok(id);
            }
        }
    }
    Err(miette!(
        "No specification section matches '{}' in this project",
        reference
    ))
}

/// Resolve a directory contact by record id, email, or full name
pub fn resolve_contact(store: &Store, project_id: &RecordId, reference: &str) -> Result<RecordId> {
    let contacts = store.project_dir_users(project_id);
    if let Ok(id) = RecordId::parse(reference) {
        if contacts.iter().any(|c| c.id == id) {
            return Ok(id);
        }
    }
    let lowered = reference.to_lowercase();
    if let Some(contact) = contacts.iter().find(|c| c.email.to_lowercase() == lowered) {
        return Ok(contact.id.clone());
    }
    let matches: Vec<_> = contacts
        .iter()
        .filter(|c| c.display_name().to_lowercase() == lowered)
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(miette!("No contact matches '{}' in this project", reference)),
        _ => Err(miette!(
            "'{}' matches more than one contact; use the id or email",
            reference
        )),
    }
}

/// Resolve a directory company by record id or name
pub fn resolve_company(store: &Store, project_id: &RecordId, reference: &str) -> Result<RecordId> {
    let companies = store.project_dir_companies(project_id);
    if let Ok(id) = RecordId::parse(reference) {
        if companies.iter().any(|c| c.id == id) {
            return Ok(id);
        }
    }
    let lowered = reference.to_lowercase();
    match companies
        .iter()
        .find(|c| c.name.to_lowercase() == lowered)
    {
        Some(company) => Ok(company.id.clone()),
        None => Err(miette!("No company matches '{}' in this project", reference)),
    }
}

/// Resolve a distribution group by record id or name
pub fn resolve_group(store: &Store, project_id: &RecordId, reference: &str) -> Result<RecordId> {
    let groups = store.project_groups(project_id);
    if let Ok(id) = RecordId::parse(reference) {
        if groups.iter().any(|g| g.id == id) {
            return Ok(id);
        }
    }
    let lowered = reference.to_lowercase();
    match groups.iter().find(|g| g.name.to_lowercase() == lowered) {
        Some(group) => Ok(group.id.clone()),
        None => Err(miette!("No group matches '{}' in this project", reference)),
    }
}

/// Resolve a document by record id or by a '/'-separated path from the
/// project root
pub fn resolve_document(store: &Store, project_id: &RecordId, reference: &str) -> Result<RecordId> {
    if let Ok(id) = RecordId::parse(reference) {
        if let Ok(doc) = store.document(&id) {
            if &doc.project_id == project_id {
                return Ok(id);
            }
        }
    }
    let mut parent: Option<RecordId> = None;
    let mut found: Option<RecordId> = None;
    for segment in reference.split('/').filter(|s| !s.is_empty()) {
        let level = store.documents_in(project_id, parent.as_ref());
        let hit = level
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(segment))
            .ok_or_else(|| miette!("No document matches '{}' in this project", reference))?;
        found = Some(hit.id.clone());
        parent = Some(hit.id.clone());
    }
    found.ok_or_else(|| miette!("No document matches '{}' in this project", reference))
}

/// Contact display name, or a dash placeholder when the reference is gone
pub fn contact_label(store: &Store, id: Option<&RecordId>) -> String {
    match id {
        Some(id) => match store.dir_user(id) {
            Ok(user) => user.display_name(),
            Err(_) => "—".to_string(),
        },
        None => "-".to_string(),
    }
}

/// Company name, or a dash placeholder when the reference is gone
pub fn company_label(store: &Store, id: Option<&RecordId>) -> String {
    match id {
        Some(id) => match store.dir_company(id) {
            Ok(company) => company.name.clone(),
            Err(_) => "—".to_string(),
        },
        None => "-".to_string(),
    }
}

/// Specification section label, or a dash placeholder when the reference
/// is gone
pub fn spec_label(store: &Store, id: Option<&RecordId>) -> String {
    match id {
        Some(id) => match store.specification(id) {
            Ok(spec) => format!("{} {}", spec.number, spec.title),
            Err(_) => "—".to_string(),
        },
        None => "-".to_string(),
    }
}

/// Copy local files into the workspace file store and return their
/// attachment metadata
pub fn stage_attachments(
    ctx: &CliContext,
    paths: &[std::path::PathBuf],
) -> Result<Vec<crate::entities::Attachment>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let files = ctx.workspace.file_store().into_diagnostic()?;
    let mut attachments = Vec::with_capacity(paths.len());
    for path in paths {
        let payload = files.put(path).into_diagnostic()?;
        attachments.push(crate::entities::Attachment {
            name: payload.name,
            size: payload.size,
            digest: payload.digest,
        });
    }
    Ok(attachments)
}

/// Ask for confirmation on stdin unless --yes was passed
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    print!("{} [y/N] ", prompt);
    io::stdout().flush().into_diagnostic()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input).into_diagnostic()?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Print a single record as YAML or JSON, or just its id
pub fn print_record<T: Serialize>(record: &T, id: &RecordId, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Id => println!("{}", id),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(record).into_diagnostic()?
        ),
        _ => print!("{}", serde_yml::to_string(record).into_diagnostic()?),
    }
    Ok(())
}

/// Print a list of records as YAML or JSON
pub fn print_records<T: Serialize>(records: &[&T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(records).into_diagnostic()?
        ),
        _ => print!("{}", serde_yml::to_string(&records).into_diagnostic()?),
    }
    Ok(())
}

/// Truncate a string for table display, appending "..." when cut
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Escape a value for CSV output
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| miette!("Invalid date '{}' (expected YYYY-MM-DD)", s))
}

/// Format an optional date for table display
pub fn fmt_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.to_string(),
        None => "-".to_string(),
    }
}

/// Format a creation timestamp for table display
pub fn fmt_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Format a contract value with thousands separators
pub fn fmt_money(value: f64) -> String {
    if value == 0.0 {
        return "-".to_string();
    }
    let whole = value.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();
    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Format a record id for table display, truncating if too long
pub fn short_id(id: &RecordId) -> String {
    let s = id.as_str();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s.to_string()
    }
}

/// Format a byte count for table display
pub fn fmt_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
