//! PopArt CLI - headless driver for the AI canvas workflows.
//!
//! Operates on a KDL scene document: import images, generate from
//! prompts (with the selected images as references), duplicate, remove
//! backgrounds, upscale, and inspect placement decisions.

mod logger;
mod onboarding;
mod ops;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use interchange::Document;
use logger::PopArtLogger;
use ops::InsertedShape;
use popart_core::{PlacementOptions, DEFAULT_GAP, DEFAULT_MAX_ATTEMPTS};
use scene::{Scene, ShapeId, ShapeKind};
use services::{
    find_model, ApiKeys, GeminiImageSize, KeySlot, NebulaClient, RemoveBgClient, ReplicateClient,
    UpscaleFactor, GEMINI_ASPECT_RATIOS, IMAGE_MODELS,
};
use std::path::{Path, PathBuf};
use store::WorkflowStore;

/// PopArt - AI image workflows on an infinite canvas, headless
#[derive(Parser)]
#[command(name = "popart")]
#[command(about = "AI image canvas workflows against a scene file")]
struct Cli {
    /// Scene document to operate on (created when missing)
    #[arg(short, long, default_value = "scene.kdl")]
    scene: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available generation models
    Models,

    /// Compute a placement for a new box without changing the scene
    Place {
        #[arg(long)]
        width: f32,
        #[arg(long)]
        height: f32,
        /// Anchor shapes the new box should land next to
        #[arg(long)]
        anchor: Vec<String>,
        /// Shapes to leave out of the obstacle set
        #[arg(long)]
        exclude: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_GAP)]
        gap: f32,
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        attempts: u32,
    },

    /// Import a local image onto the canvas
    Import { file: PathBuf },

    /// Generate an image from a prompt (selected images are references)
    Generate {
        #[arg(long)]
        prompt: String,
        /// Model id (see `popart models`)
        #[arg(long)]
        model: Option<String>,
        /// Gemini aspect ratio, e.g. 16:9
        #[arg(long)]
        aspect_ratio: Option<String>,
        /// Gemini resolution tier: 1K, 2K or 4K
        #[arg(long)]
        image_size: Option<String>,
        /// Seedream pixel size, e.g. 2048x2048
        #[arg(long)]
        size: Option<String>,
        /// Ignore the selection; plain text-to-image
        #[arg(long)]
        no_refs: bool,
    },

    /// Duplicate an image shape next to the original
    Duplicate { shape: String },

    /// Remove the background of an image shape
    RemoveBg { shape: String },

    /// Upscale an image shape with Real-ESRGAN
    Upscale {
        shape: String,
        /// Upscale factor: 2 or 4
        #[arg(long, default_value_t = 2)]
        scale: u32,
    },

    /// Select shapes (replacing the current selection)
    Select { shapes: Vec<String> },

    /// Clear the selection
    Deselect,

    /// List shapes as JSON
    Shapes,

    /// Seed the first-run walkthrough into the scene
    Onboarding {
        /// The three example images, in step order
        #[arg(num_args = 3)]
        images: Vec<PathBuf>,
    },

    /// Manage API keys (~/.popart/keys.json)
    Keys {
        #[command(subcommand)]
        command: KeysCommand,
    },
}

#[derive(Subcommand)]
enum KeysCommand {
    /// Store a key for a provider (nebula, remove-bg, replicate)
    Set { provider: String, key: String },
    /// Remove a provider's key
    Clear { provider: String },
    /// Show which providers have keys configured
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let level = std::env::var("POPART_LOG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(log::LevelFilter::Info);
    PopArtLogger::init(level)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Models => list_models(),
        Commands::Keys { command } => manage_keys(command),
        Commands::Place {
            width,
            height,
            anchor,
            exclude,
            gap,
            attempts,
        } => {
            let scene = load_scene(&cli.scene)?;
            let anchors = resolve_bounds(&scene, &anchor)?;
            let exclude = resolve_ids(&scene, &exclude)?;
            let obstacles = scene.obstacle_bounds_excluding(&exclude);
            let position = popart_core::compute_placement(
                &anchors,
                &obstacles,
                Vec2::new(width, height),
                scene.viewport.center(),
                PlacementOptions { gap, max_attempts: attempts },
            )?;
            println!(
                "{}",
                serde_json::json!({ "x": position.x, "y": position.y })
            );
            Ok(())
        }
        Commands::Import { file } => {
            let mut scene = load_scene(&cli.scene)?;
            let inserted = ops::import_image(&mut scene, &file)?;
            save_scene(&cli.scene, scene)?;
            print_inserted(&inserted);
            Ok(())
        }
        Commands::Generate {
            prompt,
            model,
            aspect_ratio,
            image_size,
            size,
            no_refs,
        } => {
            let mut scene = load_scene(&cli.scene)?;
            let mut workflow = configure_workflow(model, aspect_ratio, image_size, size)?;
            workflow.set_prompt(&prompt);

            let keys = ApiKeys::load();
            let client = NebulaClient::new(keys.get(KeySlot::Nebula)?);
            let inserted =
                ops::generate(&mut scene, &mut workflow, &client, &prompt, !no_refs).await?;
            save_scene(&cli.scene, scene)?;
            print_inserted(&inserted);
            Ok(())
        }
        Commands::Duplicate { shape } => {
            let mut scene = load_scene(&cli.scene)?;
            let id = resolve_shape_id(&scene, &shape)?;
            let inserted = ops::duplicate(&mut scene, id)?;
            save_scene(&cli.scene, scene)?;
            print_inserted(&inserted);
            Ok(())
        }
        Commands::RemoveBg { shape } => {
            let mut scene = load_scene(&cli.scene)?;
            let id = resolve_shape_id(&scene, &shape)?;
            let keys = ApiKeys::load();
            let client = RemoveBgClient::new(keys.get(KeySlot::RemoveBg)?);
            let inserted = ops::remove_background(&mut scene, &client, id).await?;
            save_scene(&cli.scene, scene)?;
            print_inserted(&inserted);
            Ok(())
        }
        Commands::Upscale { shape, scale } => {
            let factor = UpscaleFactor::parse(scale)
                .ok_or_else(|| anyhow!("Upscale factor must be 2 or 4, got {}", scale))?;
            let mut scene = load_scene(&cli.scene)?;
            let id = resolve_shape_id(&scene, &shape)?;
            let keys = ApiKeys::load();
            let client = ReplicateClient::new(keys.get(KeySlot::Replicate)?);
            let inserted = ops::upscale(&mut scene, &client, id, factor).await?;
            save_scene(&cli.scene, scene)?;
            print_inserted(&inserted);
            Ok(())
        }
        Commands::Select { shapes } => {
            let mut scene = load_scene(&cli.scene)?;
            let ids = resolve_ids(&scene, &shapes)?;
            if ids.is_empty() {
                bail!("Nothing to select");
            }
            for (i, id) in ids.iter().enumerate() {
                scene.select(*id, i > 0);
            }
            save_scene(&cli.scene, scene)?;
            Ok(())
        }
        Commands::Deselect => {
            let mut scene = load_scene(&cli.scene)?;
            scene.select_none();
            save_scene(&cli.scene, scene)?;
            Ok(())
        }
        Commands::Shapes => {
            let scene = load_scene(&cli.scene)?;
            let shapes: Vec<_> = scene.shapes().iter().map(|s| shape_info(&scene, s)).collect();
            println!("{}", serde_json::to_string_pretty(&shapes)?);
            Ok(())
        }
        Commands::Onboarding { images } => {
            let mut scene = load_scene(&cli.scene)?;
            if scene.shape_count() > 0 {
                bail!("Onboarding content is only seeded into an empty scene");
            }
            let mut assets = Vec::new();
            for path in &images {
                assets.push(ops::load_asset(path)?);
            }
            let assets: [scene::ImageAsset; 3] = assets
                .try_into()
                .map_err(|_| anyhow!("Onboarding needs exactly 3 images"))?;
            onboarding::seed(&mut scene, assets);
            save_scene(&cli.scene, scene)?;
            println!("Walkthrough seeded.");
            Ok(())
        }
    }
}

fn load_scene(path: &Path) -> Result<Scene> {
    if path.exists() {
        let doc = Document::load(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?;
        Ok(doc.scene)
    } else {
        Ok(Scene::new())
    }
}

fn save_scene(path: &Path, scene: Scene) -> Result<()> {
    Document::new(scene)
        .save(path)
        .with_context(|| format!("Failed to save scene {}", path.display()))
}

fn list_models() -> Result<()> {
    for model in &IMAGE_MODELS {
        let default = if model.id == services::default_model().id {
            " (default)"
        } else {
            ""
        };
        println!(
            "{:<32} {:<16} {} [{}]{}",
            model.id, model.name, model.description, model.size, default
        );
    }
    Ok(())
}

fn manage_keys(command: KeysCommand) -> Result<()> {
    let mut keys = ApiKeys::load();
    match command {
        KeysCommand::Set { provider, key } => {
            keys.set(parse_slot(&provider)?, key)?;
            println!("Key stored.");
        }
        KeysCommand::Clear { provider } => {
            keys.clear(parse_slot(&provider)?)?;
            println!("Key cleared.");
        }
        KeysCommand::Show => {
            for slot in [KeySlot::Nebula, KeySlot::RemoveBg, KeySlot::Replicate] {
                let state = if keys.has(slot) { "configured" } else { "missing" };
                println!("{:<12} {}", slot.provider_name(), state);
            }
        }
    }
    Ok(())
}

fn parse_slot(provider: &str) -> Result<KeySlot> {
    match provider {
        "nebula" => Ok(KeySlot::Nebula),
        "remove-bg" => Ok(KeySlot::RemoveBg),
        "replicate" => Ok(KeySlot::Replicate),
        other => bail!("Unknown provider: {} (nebula, remove-bg, replicate)", other),
    }
}

fn configure_workflow(
    model: Option<String>,
    aspect_ratio: Option<String>,
    image_size: Option<String>,
    size: Option<String>,
) -> Result<WorkflowStore> {
    let mut workflow = WorkflowStore::new();
    if let Some(model_id) = model {
        let model =
            find_model(&model_id).ok_or_else(|| anyhow!("Unknown model: {}", model_id))?;
        workflow.set_model(model);
    }
    if let Some(ratio) = aspect_ratio {
        if !GEMINI_ASPECT_RATIOS.contains(&ratio.as_str()) {
            bail!(
                "Unsupported aspect ratio: {} (one of {})",
                ratio,
                GEMINI_ASPECT_RATIOS.join(", ")
            );
        }
        workflow.set_gemini_aspect_ratio(ratio);
    }
    if let Some(tier) = image_size {
        let tier = GeminiImageSize::parse(&tier)
            .ok_or_else(|| anyhow!("Image size must be 1K, 2K or 4K, got {}", tier))?;
        workflow.set_gemini_image_size(tier);
    }
    if let Some(size) = size {
        workflow.set_seedream_size(size);
    }
    Ok(workflow)
}

/// Accept a full shape UUID or a unique prefix of one.
fn resolve_shape_id(scene: &Scene, input: &str) -> Result<ShapeId> {
    if let Some(id) = ShapeId::parse(input) {
        if scene.get_shape(id).is_some() {
            return Ok(id);
        }
    }
    let matches: Vec<ShapeId> = scene
        .shapes()
        .iter()
        .map(|s| s.id)
        .filter(|id| id.to_uuid_string().starts_with(input))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No shape matching {}", input),
        _ => bail!("Ambiguous shape id: {}", input),
    }
}

fn resolve_ids(scene: &Scene, inputs: &[String]) -> Result<Vec<ShapeId>> {
    inputs
        .iter()
        .map(|input| resolve_shape_id(scene, input))
        .collect()
}

fn resolve_bounds(scene: &Scene, inputs: &[String]) -> Result<Vec<popart_core::Bounds>> {
    let ids = resolve_ids(scene, inputs)?;
    Ok(ids
        .iter()
        .filter_map(|id| scene.get_shape(*id).map(|s| s.bounds()))
        .collect())
}

fn shape_info(scene: &Scene, shape: &scene::Shape) -> serde_json::Value {
    let kind = match &shape.kind {
        ShapeKind::Image { asset } => serde_json::json!({
            "type": "image",
            "asset": asset.to_uuid_string(),
        }),
        ShapeKind::Text { content, grey } => serde_json::json!({
            "type": "text",
            "content": content,
            "grey": grey,
        }),
        ShapeKind::Arrow { end } => serde_json::json!({
            "type": "arrow",
            "end": [end.x, end.y],
        }),
    };
    serde_json::json!({
        "id": shape.id.to_uuid_string(),
        "kind": kind,
        "position": [shape.position.x, shape.position.y],
        "size": [shape.size.x, shape.size.y],
        "selected": scene.is_selected(shape.id),
    })
}

fn print_inserted(inserted: &InsertedShape) {
    println!(
        "{}",
        serde_json::json!({
            "status": "success",
            "created": inserted.shape.to_uuid_string(),
            "asset": inserted.asset.to_uuid_string(),
            "position": [inserted.position.x, inserted.position.y],
            "size": [inserted.size.x, inserted.size.y],
        })
    );
}
