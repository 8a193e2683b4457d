// ============================================================================
// wardrobe - command-line front end for the wardrobe core
// ============================================================================
// Usage:
//   wardrobe classify <FILES|DIRS>...                 Bulk-classify garment photos
//   wardrobe plan-trip --closet DIR --destination X   Generate a trip lookbook
//   wardrobe try-on --top F --bottom F --shoe F       Render a virtual try-on
//
// Every command runs the onboarding quiz first with the profile flags, since
// nothing in the wardrobe is reachable without a profile.
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use wardrobe_core::fitting_room::{FitSlot, FittingRoom};
use wardrobe_core::onboarding::{Basics, OnboardingQuiz};
use wardrobe_core::trips::{generate_trip, TripPlanner};
use wardrobe_core::upload::{classify_batch, classify_single, BatchPolicy, ItemOutcome, UploadFile};
use wardrobe_core::{
    Action, Angle, AppState, CancellableOp, Gender, GeminiStylist, PackingCategory,
    StylistBackend, WardrobeConfig,
};

/// Digital wardrobe and AI stylist
#[derive(Parser)]
#[command(name = "wardrobe", version, about = "Classify clothes, plan trips and try outfits on")]
struct Cli {
    #[command(flatten)]
    profile: ProfileArgs,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProfileArgs {
    /// Your name
    #[arg(long, global = true, default_value = "Guest")]
    name: String,

    /// female, male or non-binary
    #[arg(long, global = true, default_value = "non-binary")]
    gender: String,

    #[arg(long, global = true, default_value = "170")]
    height_cm: u32,

    #[arg(long, global = true, default_value = "65")]
    weight_kg: u32,

    /// Must be one of the shapes offered for the gender
    #[arg(long, global = true, default_value = "Rectangle")]
    body_shape: String,

    #[arg(long, global = true, default_value = "Medium")]
    skin_tone: String,

    /// Style tags, comma separated (e.g. Minimalist,Classic)
    #[arg(long, global = true, value_delimiter = ',', default_value = "Classic")]
    style: Vec<String>,

    /// Share the profile with the AI for personalised trip plans
    #[arg(long, global = true)]
    personalize: bool,

    /// Reference photo of your face for try-on
    #[arg(long, global = true)]
    face: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify garment photos and report how many were added
    Classify {
        /// Image files or directories of images
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Classifications in flight at once (default from WARDROBE_BATCH_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Generate a day-by-day lookbook and packing list for a trip
    PlanTrip {
        /// Directory of garment photos to plan from
        #[arg(long)]
        closet: PathBuf,

        #[arg(long)]
        destination: String,

        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,

        /// Last day, YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,

        /// What the trip is for
        #[arg(long, default_value = "")]
        event: String,

        /// Only suggest items from the closet
        #[arg(long)]
        strict: bool,

        /// Allow the same item on more than one day
        #[arg(long)]
        allow_repeats: bool,

        /// Deadline in seconds (default from WARDROBE_TRIP_TIMEOUT_SECS)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Render yourself wearing a top, bottom and pair of shoes
    TryOn {
        #[arg(long)]
        top: Option<PathBuf>,

        #[arg(long)]
        bottom: Option<PathBuf>,

        #[arg(long)]
        shoe: Option<PathBuf>,

        /// Angles to render, comma separated
        #[arg(long, value_delimiter = ',', default_value = "front")]
        angles: Vec<String>,

        /// Where generated images are written
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = WardrobeConfig::from_env();
    let backend = GeminiStylist::from_config(&config)?;

    let mut state = AppState::new();
    onboard(&mut state, &cli.profile, &config).await?;

    match cli.command {
        Commands::Classify { paths, concurrency } => {
            let policy = BatchPolicy {
                concurrency: concurrency.unwrap_or(config.batch_concurrency),
            };
            cmd_classify(&backend, &mut state, &paths, policy, cli.json).await
        }
        Commands::PlanTrip {
            closet,
            destination,
            from,
            to,
            event,
            strict,
            allow_repeats,
            timeout,
        } => {
            let mut planner = TripPlanner::new();
            planner.draft.destination = destination;
            planner.draft.start_date = Some(from);
            planner.draft.end_date = Some(to);
            planner.draft.event_description = event;
            planner.draft.preferences.strict_closet_only = strict;
            planner.draft.preferences.allow_repeats = allow_repeats;
            let timeout = timeout.unwrap_or(config.trip_timeout_secs);
            cmd_plan_trip(&backend, &mut state, &closet, planner, timeout, &config, cli.json).await
        }
        Commands::TryOn {
            top,
            bottom,
            shoe,
            angles,
            out,
        } => {
            let garments = slotted_garments(top, bottom, shoe);
            cmd_try_on(&backend, &mut state, &garments, &angles, &out, cli.json).await
        }
    }
}

// ============================================================================
// Onboarding
// ============================================================================

async fn onboard(state: &mut AppState, args: &ProfileArgs, config: &WardrobeConfig) -> Result<()> {
    let gender = Gender::parse(&args.gender).ok_or_else(|| {
        anyhow!(
            "Unknown gender '{}'. Valid values: female, male, non-binary",
            args.gender
        )
    })?;

    let mut quiz = OnboardingQuiz::new();
    quiz.set_basics(Basics {
        name: args.name.clone(),
        gender,
        height_cm: args.height_cm,
        weight_kg: args.weight_kg,
        skin_tone: args.skin_tone.clone(),
    })?;
    quiz.set_personalization(args.personalize);
    if let Some(path) = &args.face {
        let face = read_image(path).await?;
        quiz.set_face_photo(Some(face));
    }
    quiz.next()?;
    quiz.choose_body_shape(&args.body_shape)?;
    quiz.next()?;
    for tag in unique_styles(&args.style) {
        quiz.toggle_style(&tag)?;
    }
    quiz.next()?;

    let profile = quiz.finish(state, config.onboarding_delay()).await?;
    info!("Onboarded as {}", profile.name);
    Ok(())
}

// ============================================================================
// Files
// ============================================================================

/// Expand directories one level deep, in name order
async fn collect_uploads(paths: &[PathBuf]) -> Result<Vec<UploadFile>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = Vec::new();
            let mut dir = tokio::fs::read_dir(path)
                .await
                .with_context(|| format!("Failed to read directory {}", path.display()))?;
            while let Some(entry) = dir.next_entry().await? {
                if entry.file_type().await?.is_file() {
                    entries.push(entry.path());
                }
            }
            entries.sort();
            for entry in entries {
                files.push(load_upload(&entry).await?);
            }
        } else {
            files.push(load_upload(path).await?);
        }
    }
    Ok(files)
}

async fn load_upload(path: &Path) -> Result<UploadFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadFile::new(name, bytes))
}

async fn read_image(path: &Path) -> Result<wardrobe_core::ImageData> {
    load_upload(path)
        .await?
        .into_image()
        .ok_or_else(|| anyhow!("{} is not an image", path.display()))
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_classify(
    backend: &dyn StylistBackend,
    state: &mut AppState,
    paths: &[PathBuf],
    policy: BatchPolicy,
    json: bool,
) -> Result<()> {
    let files = collect_uploads(paths).await?;
    let report = classify_batch(backend, state, files, policy, |progress| {
        let status = match &progress.outcome {
            ItemOutcome::Added { .. } => "added".to_string(),
            ItemOutcome::Skipped => "skipped (not an image)".to_string(),
            ItemOutcome::Failed { error } => format!("failed: {}", error),
        };
        eprintln!(
            "[{}/{}] {} {}",
            progress.index + 1,
            progress.total,
            progress.file_name,
            status
        );
    })
    .await;

    if json {
        let out = serde_json::json!({ "report": report, "items": state.items() });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{:<38} {:<10} {:<20} {:<12} {:<8}",
        "ID", "CATEGORY", "ITEM", "COLOR", "SEASON"
    );
    println!("{}", "-".repeat(92));
    for item in state.items() {
        println!(
            "{:<38} {:<10} {:<20} {:<12} {:<8}",
            item.id,
            item.category.as_str(),
            truncate(&item.sub_category, 20),
            truncate(&item.primary_color, 12),
            item.season.as_str()
        );
    }
    println!(
        "\nAdded {} of {} files ({} skipped, {} failed)",
        report.succeeded, report.total, report.skipped, report.failed
    );
    Ok(())
}

async fn cmd_plan_trip(
    backend: &dyn StylistBackend,
    state: &mut AppState,
    closet: &Path,
    mut planner: TripPlanner,
    timeout_secs: u64,
    config: &WardrobeConfig,
    json: bool,
) -> Result<()> {
    let files = collect_uploads(&[closet.to_path_buf()]).await?;
    let policy = BatchPolicy {
        concurrency: config.batch_concurrency,
    };
    let report = classify_batch(backend, state, files, policy, |_| {}).await;
    info!("Closet loaded: {} items", report.succeeded);

    planner.next()?;
    planner.next()?;
    if !planner.can_generate() {
        anyhow::bail!("Trip details are incomplete");
    }

    let op = CancellableOp::new("trip lookbook", std::time::Duration::from_secs(timeout_secs));
    let token = op.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let (trip, audit) = generate_trip(backend, state, &planner.draft, &op).await?;

    if json {
        let out = serde_json::json!({
            "trip": trip,
            "unknownReferences": audit.unknown_references,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "=== {} ({} to {}, {} days) ===",
        trip.destination,
        trip.start_date,
        trip.end_date,
        trip.duration_days()
    );
    println!("Weather: {}\n", trip.weather_summary);
    for look in &trip.daily_plan {
        println!("Day {} ({}): {}", look.day, look.date, look.event_description);
        println!("  Forecast: {}", look.weather_forecast);
        for id in look.outfit.item_ids() {
            let label = state
                .item(id)
                .map(|i| i.describe())
                .unwrap_or_else(|| format!("{} (not in closet)", id));
            println!("  - {}", label);
        }
        if !look.outfit.notes.is_empty() {
            println!("  Notes: {}", look.outfit.notes);
        }
    }

    println!("\nPacking list:");
    for (label, category) in [
        ("Clothes", PackingCategory::Clothes),
        ("Toiletries", PackingCategory::Toiletries),
        ("Misc", PackingCategory::Misc),
    ] {
        println!("  {}:", label);
        for entry in trip.packing_list.list(category) {
            println!("    [ ] {}", entry);
        }
    }

    if !audit.is_clean() {
        warn!(
            "{} suggested item(s) are not in your closet",
            audit.unknown_references.len()
        );
    }
    Ok(())
}

async fn cmd_try_on(
    backend: &dyn StylistBackend,
    state: &mut AppState,
    garments: &[(FitSlot, PathBuf)],
    angles: &[String],
    out: &Path,
    json: bool,
) -> Result<()> {
    if garments.is_empty() {
        anyhow::bail!("Pass at least one of --top, --bottom or --shoe");
    }
    let angles = angles
        .iter()
        .map(|a| parse_angle(a))
        .collect::<Result<Vec<_>>>()?;

    // Each file goes into the slot its flag names, whatever the classifier says
    let mut room = FittingRoom::new(&[], None);
    for (slot, path) in garments {
        let image = read_image(path).await?;
        let item = classify_single(backend, image).await;
        info!("{} classified as {}", path.display(), item.describe());
        state.dispatch(Action::AddItem(item.clone()))?;
        room.set(*slot, item);
    }

    let profile = state
        .profile()
        .cloned()
        .ok_or_else(|| anyhow!("No profile"))?;
    if profile.face_photo.is_none() {
        warn!("No --face photo given; the render will not match your likeness");
    }

    state.dispatch(Action::Navigate(wardrobe_core::View::FittingRoom))?;
    let verdict = room.generate(backend, &profile).await?.verdict.clone();

    tokio::fs::create_dir_all(out)
        .await
        .with_context(|| format!("Failed to create {}", out.display()))?;
    let mut written = Vec::new();
    for angle in angles {
        let image = room.show_angle(backend, &profile, angle).await?.clone();
        let path = out.join(format!("try-on-{}.{}", angle.as_str(), image.extension()));
        tokio::fs::write(&path, &image.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if json {
        let out = serde_json::json!({
            "images": written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "verdict": verdict,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for path in &written {
        println!("Wrote {}", path.display());
    }
    match verdict {
        Some(v) => {
            println!("\nIdentity match: {:.0}/100", v.identity_match_score);
            println!("Realism:        {:.0}/100", v.realism_score);
            println!("Style advice:   {}", v.style_advice);
            println!("Colors:         {}", v.color_analysis);
        }
        None => println!("\nNo critique available for this render"),
    }
    Ok(())
}

/// Pair each garment flag with its slot, dropping flags that were not given
fn slotted_garments(
    top: Option<PathBuf>,
    bottom: Option<PathBuf>,
    shoe: Option<PathBuf>,
) -> Vec<(FitSlot, PathBuf)> {
    [(FitSlot::Top, top), (FitSlot::Bottom, bottom), (FitSlot::Shoe, shoe)]
        .into_iter()
        .filter_map(|(slot, path)| path.map(|p| (slot, p)))
        .collect()
}

/// Style tags in flag order, repeats removed (the quiz toggles, so a
/// repeated tag would deselect itself)
fn unique_styles(tags: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !unique.iter().any(|u| u.eq_ignore_ascii_case(tag)) {
            unique.push(tag.to_string());
        }
    }
    unique
}

fn parse_angle(s: &str) -> Result<Angle> {
    Angle::ALL
        .into_iter()
        .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| anyhow!("Unknown angle '{}'. Valid values: front, side, back", s))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan_trip_flags() {
        let cli = Cli::try_parse_from([
            "wardrobe",
            "plan-trip",
            "--closet",
            "closet",
            "--destination",
            "Kyoto",
            "--from",
            "2026-04-01",
            "--to",
            "2026-04-05",
            "--strict",
            "--gender",
            "female",
        ])
        .unwrap();
        assert_eq!(cli.profile.gender, "female");
        match cli.command {
            Commands::PlanTrip {
                from, strict, allow_repeats, ..
            } => {
                assert_eq!(from, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
                assert!(strict);
                assert!(!allow_repeats);
            }
            _ => panic!("expected plan-trip"),
        }
    }

    #[test]
    fn test_garment_flags_keep_their_slots() {
        let garments = slotted_garments(
            Some(PathBuf::from("jacket.jpg")),
            None,
            Some(PathBuf::from("boots.jpg")),
        );
        assert_eq!(
            garments,
            vec![
                (FitSlot::Top, PathBuf::from("jacket.jpg")),
                (FitSlot::Shoe, PathBuf::from("boots.jpg")),
            ]
        );
        assert!(slotted_garments(None, None, None).is_empty());
    }

    #[test]
    fn test_repeated_style_flags_are_deduplicated() {
        let tags: Vec<String> = ["Classic", "classic", " ", "Vintage", "Classic"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(unique_styles(&tags), vec!["Classic", "Vintage"]);
    }

    #[test]
    fn test_parse_angle_and_truncate() {
        assert_eq!(parse_angle("Back").unwrap(), Angle::Back);
        assert!(parse_angle("top").is_err());
        assert_eq!(truncate("Linen shirt", 20), "Linen shirt");
        assert_eq!(truncate("Extremely long garment name", 10), "Extreme...");
    }
}
