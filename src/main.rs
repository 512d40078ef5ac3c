use std::path::{Path, PathBuf};
use std::sync::Arc;

use aesthetica_studio::config::CONFIG;
use aesthetica_studio::llm::capability::{
    AnalysisPayload, AnnotationRequest, ChatReply, ChatRequest, PartialStudioConfig,
    PortraitRequest, SuggestedOption, TextRequest,
};
use aesthetica_studio::llm::media::detect_mime_type;
use aesthetica_studio::llm::{
    AestheticCapability, CapabilityError, GeminiSettings, GeminiStudioClient,
};
use aesthetica_studio::portrait::lexicon::{
    environment_entry, environment_keys, lighting_entry, lighting_keys,
};
use aesthetica_studio::portrait::types::ScenarioPreset;
use aesthetica_studio::portrait::{BeautyDial, FashionSlot, PortraitView, StyleCategory};
use aesthetica_studio::session::{SlotStatus, StudioSession, ViewOutcome};
use aesthetica_studio::utils::logging::init_logging;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use dotenvy::dotenv;
use serde_json::json;
use tracing::{info, warn};

fn known_keys(keys: impl Iterator<Item = &'static str>) -> String {
    keys.collect::<Vec<_>>().join(", ")
}

fn usage() -> String {
    let text = "Usage: aesthetica_studio <prompt|scenarios|analyze> [options]\n\
     \n\
     prompt     print the portrait instruction for each view (no API call)\n\
     scenarios  list scenario presets (--refresh asks the model for new ones)\n\
     analyze    run the full consultation and write the report to the output dir\n\
     \n\
     Options:\n\
       --image <path>                      source photo (analyze)\n\
       --view <front|side45|side90>        extra view to generate, repeatable\n\
       --style <category>:<sub>[:<n>]      style selection, e.g. classical:xionghun:80\n\
       --beauty <dial>=<0-100>             beauty dial, repeatable\n\
       --fashion <slot>=<option>           fashion option, repeatable\n\
       --background <lighting>:<env>       background selection\n\
       --scenario <id>                     apply a scenario preset before generating\n\
       --random-hairstyle                  pick a hairstyle at random\n\
       --seed <n>                          seed for random picks\n\
       --no-annotations                    skip annotation overlays\n\
       --ask <question>                    follow-up question after analysis\n\
       --refresh                           refresh scenario presets (scenarios)\n\
       --output <dir>                      output directory";
    format!(
        "{text}\n\nLighting: {}\nEnvironment: {}",
        known_keys(lighting_keys()),
        known_keys(environment_keys())
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliCommand {
    Prompt,
    Scenarios,
    Analyze,
}

#[derive(Debug)]
struct CliArgs {
    command: CliCommand,
    image: Option<PathBuf>,
    views: Vec<PortraitView>,
    style: Option<(StyleCategory, String, i64)>,
    beauty: Vec<(BeautyDial, i64)>,
    fashion: Vec<(FashionSlot, String)>,
    background: Option<(String, String)>,
    scenario: Option<String>,
    random_hairstyle: bool,
    seed: Option<u64>,
    annotations: bool,
    questions: Vec<String>,
    refresh: bool,
    output_dir: PathBuf,
}

fn flag_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing value for {flag}"))
}

fn parse_percent(value: &str, flag: &str) -> Result<i64> {
    let parsed = value
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow!("Invalid {flag} value: {value}"))?;
    if !(0..=100).contains(&parsed) {
        return Err(anyhow!("{flag} value must be between 0 and 100: {value}"));
    }
    Ok(parsed)
}

fn parse_style(value: &str) -> Result<(StyleCategory, String, i64)> {
    let mut parts = value.splitn(3, ':');
    let category = parts.next().unwrap_or_default();
    let category = StyleCategory::from_str(category)
        .ok_or_else(|| anyhow!("Unknown style category: {category}"))?;
    let sub_option = parts.next().unwrap_or("standard").trim().to_string();
    let intensity = match parts.next() {
        Some(intensity) => parse_percent(intensity, "--style")?,
        None => 50,
    };
    Ok((category, sub_option, intensity))
}

fn parse_pair<'a>(value: &'a str, separator: char, flag: &str) -> Result<(&'a str, &'a str)> {
    value
        .split_once(separator)
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .ok_or_else(|| anyhow!("Expected {flag} <key>{separator}<value>, got: {value}"))
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let command = match args.get(1).map(String::as_str) {
        Some("prompt") => CliCommand::Prompt,
        Some("scenarios") => CliCommand::Scenarios,
        Some("analyze") => CliCommand::Analyze,
        Some("--help") | Some("-h") | None => return Err(anyhow!(usage())),
        Some(other) => return Err(anyhow!("Unknown command: {other}\n{}", usage())),
    };

    let mut parsed = CliArgs {
        command,
        image: None,
        views: Vec::new(),
        style: None,
        beauty: Vec::new(),
        fashion: Vec::new(),
        background: None,
        scenario: None,
        random_hairstyle: false,
        seed: None,
        annotations: true,
        questions: Vec::new(),
        refresh: false,
        output_dir: CONFIG.output_dir.clone(),
    };

    let mut index = 2;
    while index < args.len() {
        let flag = args[index].as_str();
        match flag {
            "--image" => {
                index += 1;
                parsed.image = Some(PathBuf::from(flag_value(args, index, flag)?));
            }
            "--view" => {
                index += 1;
                let value = flag_value(args, index, flag)?;
                let view = PortraitView::from_str(value)
                    .ok_or_else(|| anyhow!("Unknown view: {value}"))?;
                if !parsed.views.contains(&view) {
                    parsed.views.push(view);
                }
            }
            "--style" => {
                index += 1;
                parsed.style = Some(parse_style(flag_value(args, index, flag)?)?);
            }
            "--beauty" => {
                index += 1;
                let (key, value) = parse_pair(flag_value(args, index, flag)?, '=', flag)?;
                let dial = BeautyDial::from_key(key)
                    .ok_or_else(|| anyhow!("Unknown beauty dial: {key}"))?;
                parsed.beauty.push((dial, parse_percent(value, flag)?));
            }
            "--fashion" => {
                index += 1;
                let (key, value) = parse_pair(flag_value(args, index, flag)?, '=', flag)?;
                let slot = FashionSlot::from_str(key)
                    .ok_or_else(|| anyhow!("Unknown fashion slot: {key}"))?;
                parsed.fashion.push((slot, value.to_string()));
            }
            "--background" => {
                index += 1;
                let (lighting, environment) =
                    parse_pair(flag_value(args, index, flag)?, ':', flag)?;
                parsed.background = Some((lighting.to_string(), environment.to_string()));
            }
            "--scenario" => {
                index += 1;
                parsed.scenario = Some(flag_value(args, index, flag)?.trim().to_string());
            }
            "--random-hairstyle" => {
                parsed.random_hairstyle = true;
            }
            "--seed" => {
                index += 1;
                let value = flag_value(args, index, flag)?;
                parsed.seed = Some(
                    value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| anyhow!("Invalid --seed value: {value}"))?,
                );
            }
            "--no-annotations" => {
                parsed.annotations = false;
            }
            "--ask" => {
                index += 1;
                parsed.questions.push(flag_value(args, index, flag)?.to_string());
            }
            "--refresh" => {
                parsed.refresh = true;
            }
            "--output" => {
                index += 1;
                parsed.output_dir = PathBuf::from(flag_value(args, index, flag)?);
            }
            "--help" | "-h" => return Err(anyhow!(usage())),
            other => {
                return Err(anyhow!("Unknown argument: {other}\n{}", usage()));
            }
        }
        index += 1;
    }

    if parsed.command == CliCommand::Analyze && parsed.image.is_none() {
        return Err(anyhow!("--image is required for analyze"));
    }
    if parsed.command == CliCommand::Prompt && parsed.scenario.is_some() {
        return Err(anyhow!("--scenario needs the model; use it with analyze"));
    }
    Ok(parsed)
}

/// Stand-in used by `prompt`, which only exercises local configuration.
struct OfflineCapability;

fn offline() -> CapabilityError {
    CapabilityError::Request("offline: no model is configured for this command".to_string())
}

#[async_trait]
impl AestheticCapability for OfflineCapability {
    async fn analyze_aesthetics(
        &self,
        _image: &[u8],
        _request: &TextRequest,
    ) -> Result<AnalysisPayload, CapabilityError> {
        Err(offline())
    }

    async fn generate_portrait(
        &self,
        _image: &[u8],
        _request: &PortraitRequest,
    ) -> Result<Vec<u8>, CapabilityError> {
        Err(offline())
    }

    async fn generate_annotation(
        &self,
        _clean_image: &[u8],
        _request: &AnnotationRequest,
    ) -> Result<Vec<u8>, CapabilityError> {
        Err(offline())
    }

    async fn suggest_options(
        &self,
        _request: &TextRequest,
    ) -> Result<Vec<SuggestedOption>, CapabilityError> {
        Err(offline())
    }

    async fn suggest_scenarios(
        &self,
        _request: &TextRequest,
    ) -> Result<Vec<ScenarioPreset>, CapabilityError> {
        Err(offline())
    }

    async fn resolve_scenario(
        &self,
        _request: &TextRequest,
    ) -> Result<PartialStudioConfig, CapabilityError> {
        Err(offline())
    }

    async fn explain_term(&self, _request: &TextRequest) -> Result<String, CapabilityError> {
        Err(offline())
    }

    async fn chat(&self, _request: &ChatRequest) -> Result<ChatReply, CapabilityError> {
        Err(offline())
    }
}

fn build_session(args: &CliArgs, online: bool) -> Result<StudioSession> {
    let mut options = CONFIG.session_options();
    options.seed = args.seed.or(options.seed);
    options.annotations_enabled = options.annotations_enabled && args.annotations;

    let capability: Arc<dyn AestheticCapability> = if online {
        Arc::new(GeminiStudioClient::new(GeminiSettings::from_config(&CONFIG))?)
    } else {
        Arc::new(OfflineCapability)
    };
    Ok(StudioSession::new(capability, options))
}

async fn apply_selections(session: &StudioSession, args: &CliArgs) -> Result<()> {
    if let Some(scenario) = &args.scenario {
        let config = session.apply_scenario(scenario).await?;
        info!(
            "Scenario {scenario} applied: style={}/{}",
            config.style.category, config.style.sub_option
        );
    }
    for (dial, value) in &args.beauty {
        session.set_beauty_dial(*dial, *value).await?;
    }
    if let Some((category, sub_option, intensity)) = &args.style {
        session.select_style(*category, sub_option, *intensity).await?;
    }
    for (slot, option_id) in &args.fashion {
        if session.config().fashion.get(*slot) != Some(option_id.as_str()) {
            session.toggle_fashion(*slot, option_id).await?;
        }
    }
    if args.random_hairstyle {
        match session.randomize_hairstyle().await? {
            Some(choice) => info!("Random hairstyle: {} ({})", choice.label, choice.id),
            None => warn!("No hairstyle options to choose from"),
        }
    }
    if let Some((lighting, environment)) = &args.background {
        if lighting_entry(lighting).is_none() {
            warn!(
                "Unknown lighting '{lighting}', the studio baseline is used (known: {})",
                known_keys(lighting_keys())
            );
        }
        if environment_entry(environment).is_none() {
            warn!(
                "Unknown environment '{environment}', the solid baseline is used (known: {})",
                known_keys(environment_keys())
            );
        }
        session.set_background(lighting, environment).await?;
    }
    Ok(())
}

fn requested_views(args: &CliArgs) -> Vec<PortraitView> {
    let mut views = vec![PortraitView::Front];
    for view in &args.views {
        if !views.contains(view) {
            views.push(*view);
        }
    }
    views
}

fn image_extension(bytes: &[u8]) -> &'static str {
    match detect_mime_type(bytes).as_deref() {
        Some("image/png") => "png",
        Some("image/webp") => "webp",
        _ => "jpg",
    }
}

async fn write_image(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.{}", image_extension(bytes)));
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

async fn run_prompt(args: &CliArgs) -> Result<()> {
    let session = build_session(args, false)?;
    apply_selections(&session, args).await?;
    let views = if args.views.is_empty() {
        PortraitView::ALL.to_vec()
    } else {
        args.views.clone()
    };
    for view in views {
        println!("=== {view} ===\n{}\n", session.portrait_prompt(view));
    }
    Ok(())
}

async fn run_scenarios(args: &CliArgs) -> Result<()> {
    let session = build_session(args, args.refresh)?;
    let presets = if args.refresh {
        session.refresh_scenarios().await
    } else {
        session.scenario_presets()
    };
    for preset in presets {
        let icon = if preset.icon.is_empty() { "-" } else { preset.icon.as_str() };
        println!("{:<14} {icon} {}  {}", preset.id, preset.name, preset.description);
    }
    Ok(())
}

async fn run_analyze(args: &CliArgs) -> Result<()> {
    let image_path = args
        .image
        .as_ref()
        .ok_or_else(|| anyhow!("--image is required for analyze"))?;
    let image = tokio::fs::read(image_path)
        .await
        .with_context(|| format!("Failed to read {}", image_path.display()))?;

    let session = build_session(args, true)?;
    apply_selections(&session, args).await?;
    session.select_image(image)?;

    let analysis = session.analyze().await?;
    println!("Total score: {}", analysis.scores.total);
    println!("{}", analysis.summary);
    if !analysis.keywords.is_empty() {
        println!("Keywords: {}", analysis.keywords.join(" / "));
    }

    for view in requested_views(args).into_iter().skip(1) {
        match session.switch_view(view).await {
            Ok(ViewOutcome::Generated) | Ok(ViewOutcome::Cached) => {}
            Ok(outcome) => warn!("View {view} finished as {}", outcome.as_str()),
            Err(err) => warn!("View {view} failed: {err}"),
        }
    }

    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;

    let mut views = serde_json::Map::new();
    for view in requested_views(args) {
        let status = session.view_status(view);
        let Some(images) = session.view_images(view) else {
            views.insert(view.as_str().to_string(), json!({ "status": status }));
            continue;
        };
        let clean = write_image(&args.output_dir, &format!("{view}-clean"), &images.clean).await?;
        let annotated = match &images.annotated {
            Some(annotated) if status.annotated == SlotStatus::Ready => Some(
                write_image(&args.output_dir, &format!("{view}-annotated"), annotated).await?,
            ),
            _ => None,
        };
        views.insert(
            view.as_str().to_string(),
            json!({
                "status": status,
                "clean": clean.display().to_string(),
                "annotated": annotated.map(|path| path.display().to_string()),
            }),
        );
    }

    let mut conversation = Vec::new();
    for question in &args.questions {
        let reply = session.chat(question).await;
        println!("\nQ: {question}\nA: {}", reply.text);
        for suggestion in &reply.suggested_questions {
            println!("  - {suggestion}");
        }
        conversation.push(json!({
            "question": question,
            "answer": reply.text,
            "suggested_questions": reply.suggested_questions,
        }));
    }

    let report = json!({
        "analysis": analysis,
        "config": session.config(),
        "views": views,
        "conversation": conversation,
    });
    let report_path = args.output_dir.join("report.json");
    tokio::fs::write(&report_path, serde_json::to_vec_pretty(&report)?)
        .await
        .with_context(|| format!("Failed to write {}", report_path.display()))?;
    info!("Report written to {}", report_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guards = init_logging();

    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;
    info!("Starting Aesthetica studio ({:?})", args.command);

    match args.command {
        CliCommand::Prompt => run_prompt(&args).await,
        CliCommand::Scenarios => run_scenarios(&args).await,
        CliCommand::Analyze => run_analyze(&args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(line: &str) -> Vec<String> {
        std::iter::once("aesthetica_studio".to_string())
            .chain(line.split_whitespace().map(str::to_string))
            .collect()
    }

    #[test]
    fn parses_analyze_flags() {
        let args = parse_args(&argv(
            "analyze --image face.jpg --view side90 --view side90 --style classical:xionghun:80 \
             --beauty jawline=60 --fashion hairstyle=h_wavy --background cinematic:indoor --seed 9",
        ))
        .unwrap();
        assert_eq!(args.command, CliCommand::Analyze);
        assert_eq!(args.views, vec![PortraitView::Side90]);
        assert_eq!(
            args.style,
            Some((StyleCategory::Classical, "xionghun".to_string(), 80))
        );
        assert_eq!(args.beauty, vec![(BeautyDial::Jawline, 60)]);
        assert_eq!(args.fashion, vec![(FashionSlot::Hairstyle, "h_wavy".to_string())]);
        assert_eq!(
            args.background,
            Some(("cinematic".to_string(), "indoor".to_string()))
        );
        assert_eq!(args.seed, Some(9));
        assert_eq!(
            requested_views(&args),
            vec![PortraitView::Front, PortraitView::Side90]
        );
    }

    #[test]
    fn usage_lists_background_keys() {
        let text = usage();
        assert!(text.contains("Lighting: studio"));
        assert!(text.contains("Environment: solid"));
        assert!(text.contains("outdoor"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&argv("analyze")).is_err());
        assert!(parse_args(&argv("prompt --beauty jawline=120")).is_err());
        assert!(parse_args(&argv("prompt --beauty cheekbones=20")).is_err());
        assert!(parse_args(&argv("prompt --scenario boss")).is_err());
        assert!(parse_args(&argv("paint")).is_err());
    }

    #[tokio::test]
    async fn prompt_selections_apply_offline() {
        let args = parse_args(&argv(
            "prompt --style classical:xionghun:80 --fashion necklace=n_pearl",
        ))
        .unwrap();
        let session = build_session(&args, false).unwrap();
        apply_selections(&session, &args).await.unwrap();
        let prompt = session.portrait_prompt(PortraitView::Front);
        assert!(prompt.contains("XiongHun"));
        assert_eq!(session.config().fashion.get(FashionSlot::Necklace), Some("n_pearl"));
    }
}
