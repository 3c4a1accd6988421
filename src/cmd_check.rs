//! `tourguide check`: load a script the way playback would and report on it.

use tracing::info;

use tourguide_config::Config;
use tourguide_core::{DurationPolicy, ScriptLoader, ScriptSource};
use tourguide_protocols::{PageId, PlaybackMode, Script, Step};

/// One line per step: position, id, type, page and target.
fn describe_step(index: usize, step: &Step) -> String {
    let page = step.page.as_deref().filter(|p| !p.is_empty()).unwrap_or("-");
    let target = step.target.as_deref().unwrap_or("-");
    let mut line = format!(
        "{:>3}. {:<16} {:<9} page={:<16} target={}",
        index + 1,
        step.id,
        step.step_type.to_string(),
        page,
        target
    );
    if let Some(ms) = step.duration {
        line.push_str(&format!(" duration={}ms", ms));
    }
    if !step.actions.is_empty() {
        line.push_str(&format!(" actions={}", step.actions.len()));
    }
    line
}

/// Steps that would play, with their position in the full script.
fn selected_steps<'a>(script: &'a Script, page: Option<&str>) -> Vec<(usize, &'a Step)> {
    match page {
        Some(page) => {
            let current = PageId::normalize(page);
            script
                .steps
                .iter()
                .enumerate()
                .filter(|(_, step)| step.page_id() == current)
                .collect()
        }
        None => script.steps.iter().enumerate().collect(),
    }
}

pub(crate) async fn check(
    mut config: Config,
    path: Option<String>,
    page: Option<String>,
    project_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if project_id.is_some() {
        config.source.project_id = project_id;
    }
    if let Some(path) = path {
        config.source.script_path = path;
    }

    let source = ScriptSource::resolve(&config.source, None);
    let loader = ScriptLoader::from_config(&config.source)?;
    let loaded = loader.load(&source).await?;
    let script = &loaded.script;

    println!(
        "Project: {} ({} steps, entry {})",
        script.meta.project,
        script.steps.len(),
        script.meta.entry_url
    );

    if loaded.repairs.is_empty() {
        println!("Repairs: none");
    } else {
        println!("Repairs ({}):", loaded.repairs.len());
        for note in &loaded.repairs {
            println!("  - {}", note);
        }
    }

    let policy = DurationPolicy::new(
        config.playback.recommended_min_step_ms,
        config.playback.recommended_max_step_ms,
    );
    let warnings = policy.check(script);
    if !warnings.is_empty() {
        println!("Duration warnings ({}):", warnings.len());
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    let steps = selected_steps(script, page.as_deref());
    match &page {
        Some(page) => println!(
            "Steps for page '{}' in {} mode ({}):",
            page,
            PlaybackMode::Page,
            steps.len()
        ),
        None => println!("Steps ({}):", steps.len()),
    }
    for (index, step) in steps {
        println!("  {}", describe_step(index, step));
    }

    info!(
        "Checked script with {} repairs and {} duration warnings",
        loaded.repairs.len(),
        warnings.len()
    );
    Ok(())
}
