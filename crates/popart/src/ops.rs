//! Canvas workflow operations.
//!
//! Each operation composes the scene, the placement engine, and (for
//! the AI workflows) a service client plus the workflow store. Every
//! shape an operation produces is positioned by the placement engine:
//! anchored on its source shape when it has one, otherwise placed near
//! the viewport center.

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use popart_core::{compute_placement, Bounds, CanvasSource, PlacementOptions};
use scene::{AssetId, ImageAsset, Scene, Shape, ShapeId};
use services::{data_url, NebulaClient, RemoveBgClient, ReplicateClient, UpscaleFactor};
use std::path::Path;
use store::WorkflowStore;

/// What an operation put on the canvas.
#[derive(Clone, Debug)]
pub struct InsertedShape {
    pub shape: ShapeId,
    pub asset: AssetId,
    pub position: Vec2,
    pub size: Vec2,
}

/// Import a local image file onto the canvas.
///
/// The display size is the pixel size scaled down to fit the maximum
/// display box; with nothing selected the image lands at the viewport
/// center when that spot is free.
pub fn import_image(scene: &mut Scene, path: &Path) -> Result<InsertedShape> {
    let asset = load_asset(path)?;
    let size = asset.display_size();

    let inserted = place_and_insert(scene, asset, size, &[], &[])?;
    log::info!("imported {} as {}", path.display(), inserted.shape);
    Ok(inserted)
}

/// Read a local image file into an asset (without inserting it).
pub fn load_asset(path: &Path) -> Result<ImageAsset> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let format = image::guess_format(&bytes)
        .with_context(|| format!("{} is not a supported image", path.display()))?;
    let (width, height) = dimensions_of(&bytes)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let mime = format.to_mime_type();
    Ok(ImageAsset::new(
        name,
        data_url::encode(&bytes, mime),
        width,
        height,
        mime,
    ))
}

/// Generate an image from a prompt, using the selected image shapes as
/// references (anchors and image-to-image input).
///
/// Admission goes through the store: the call is rejected outright when
/// the in-flight cap is reached. A failed request releases its slot and
/// records the error before bubbling it up.
pub async fn generate(
    scene: &mut Scene,
    workflow: &mut WorkflowStore,
    client: &NebulaClient,
    prompt: &str,
    include_references: bool,
) -> Result<InsertedShape> {
    let anchors = scene.selected_image_bounds();
    let source_shape = scene.selected_images().first().map(|s| s.id);
    let references = if include_references {
        selected_reference_images(scene)
    } else {
        Vec::new()
    };

    let task = workflow.begin(source_shape, prompt)?;
    let params = workflow.generation_params(prompt, references);

    match client.generate(&params).await {
        Ok(image) => {
            let url = data_url::to_data_url(&image.base64, &image.mime_type);
            workflow.complete(task, url.clone())?;

            let (_, bytes) = data_url::parse(&url)?;
            let (width, height) = dimensions_of(&bytes)?;
            let asset = ImageAsset::new("generated-image.png", url, width, height, image.mime_type);
            let size = asset.display_size();
            let inserted = place_and_insert(scene, asset, size, &anchors, &[])?;
            log::info!("generated {} for task {}", inserted.shape, task);
            Ok(inserted)
        }
        Err(e) => {
            workflow.fail(task, e.to_string())?;
            Err(e.into())
        }
    }
}

/// Duplicate an image shape. The copy shares the original's asset and
/// lands next to it.
pub fn duplicate(scene: &mut Scene, shape_id: ShapeId) -> Result<InsertedShape> {
    let source = image_shape(scene, shape_id)?;
    let (anchor, size) = (source.bounds(), source.size);
    let asset = source
        .asset_id()
        .ok_or_else(|| anyhow!("Shape {} has no asset", shape_id))?;

    let position = place(scene, &[anchor], size, &[])?;
    let id = scene.add_shape(Shape::image(asset, position, size));
    scene.select(id, false);
    Ok(InsertedShape {
        shape: id,
        asset,
        position,
        size,
    })
}

/// Remove the background of an image shape. The cut-out becomes a new
/// shape next to the original, at the same display size.
pub async fn remove_background(
    scene: &mut Scene,
    client: &RemoveBgClient,
    shape_id: ShapeId,
) -> Result<InsertedShape> {
    let source = image_shape(scene, shape_id)?;
    let (anchor, size) = (source.bounds(), source.size);
    let src = shape_asset(scene, &source)?.src.clone();

    let result = client.remove_background(&src).await?;
    let url = data_url::to_data_url(&result.base64, &result.mime_type);
    let (_, bytes) = data_url::parse(&url)?;
    let (width, height) = dimensions_of(&bytes)?;

    let asset = ImageAsset::new("no-background.png", url, width, height, result.mime_type);
    let inserted = place_and_insert(scene, asset, size, &[anchor], &[])?;
    scene.select(inserted.shape, false);
    log::info!("background removed into {}", inserted.shape);
    Ok(inserted)
}

/// Upscale an image shape. The result becomes a new shape next to the
/// original, displayed at the original's size times the factor.
pub async fn upscale(
    scene: &mut Scene,
    client: &ReplicateClient,
    shape_id: ShapeId,
    factor: UpscaleFactor,
) -> Result<InsertedShape> {
    let source = image_shape(scene, shape_id)?;
    let (anchor, display) = (source.bounds(), source.size);
    let src = shape_asset(scene, &source)?.src.clone();

    let result = client.upscale(&src, factor).await?;
    let fetched = client.fetch_image(&result.url).await?;
    let url = data_url::to_data_url(&fetched.base64, &fetched.mime_type);
    let (_, bytes) = data_url::parse(&url)?;
    let (width, height) = dimensions_of(&bytes)?;

    let asset = ImageAsset::new(
        format!("upscaled-{}x.png", factor.as_u32()),
        url,
        width,
        height,
        fetched.mime_type,
    );
    let size = display * factor.as_f32();
    let inserted = place_and_insert(scene, asset, size, &[anchor], &[])?;
    scene.select(inserted.shape, false);
    log::info!("upscaled {}x into {}", factor.as_u32(), inserted.shape);
    Ok(inserted)
}

/// Run the placement engine against the live scene.
pub fn place(
    scene: &Scene,
    anchors: &[Bounds],
    size: Vec2,
    exclude: &[ShapeId],
) -> Result<Vec2> {
    let obstacles = scene.obstacle_bounds_excluding(exclude);
    let position = compute_placement(
        anchors,
        &obstacles,
        size,
        scene.viewport_center(),
        PlacementOptions::default(),
    )?;
    Ok(position)
}

fn place_and_insert(
    scene: &mut Scene,
    asset: ImageAsset,
    size: Vec2,
    anchors: &[Bounds],
    exclude: &[ShapeId],
) -> Result<InsertedShape> {
    let position = place(scene, anchors, size, exclude)?;
    let asset_id = scene.add_asset(asset);
    let shape = scene.add_shape(Shape::image(asset_id, position, size));
    Ok(InsertedShape {
        shape,
        asset: asset_id,
        position,
        size,
    })
}

/// Data URLs of the selected image shapes' assets, in z-order.
fn selected_reference_images(scene: &Scene) -> Vec<String> {
    scene
        .selected_images()
        .iter()
        .filter_map(|shape| {
            shape
                .asset_id()
                .and_then(|id| scene.get_asset(id))
                .map(|asset| asset.src.clone())
        })
        .collect()
}

fn image_shape(scene: &Scene, id: ShapeId) -> Result<Shape> {
    let shape = scene
        .get_shape(id)
        .ok_or_else(|| anyhow!("No shape {}", id))?;
    if !shape.is_image() {
        return Err(anyhow!("Shape {} is not an image", id));
    }
    Ok(shape.clone())
}

fn shape_asset<'a>(scene: &'a Scene, shape: &Shape) -> Result<&'a ImageAsset> {
    let asset_id = shape
        .asset_id()
        .ok_or_else(|| anyhow!("Shape {} has no asset", shape.id))?;
    scene
        .get_asset(asset_id)
        .ok_or_else(|| anyhow!("Asset {} not found", asset_id))
}

/// Image dimensions without a full decode.
fn dimensions_of(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader =
        image::ImageReader::new(std::io::Cursor::new(bytes)).with_guessed_format()?;
    reader.into_dimensions().context("Failed to read image dimensions")
}
