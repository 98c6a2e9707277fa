//! First-run walkthrough content.
//!
//! Seeds an empty scene with three example images laid out as a
//! pipeline (image, arrow, image, arrow, image), a step label and an
//! example prompt under each, and a closing tip, then fits the viewport
//! to the result. The layout is computed separately from the insertion
//! so the geometry is testable on its own.

use glam::Vec2;
use popart_core::Bounds;
use scene::{ImageAsset, Scene, Shape};

/// Display size every walkthrough image is scaled to.
pub const IMAGE_DISPLAY_SIZE: f32 = 300.0;
const IMAGE_GAP: f32 = 60.0;
const ARROW_LENGTH: f32 = 60.0;

/// Rough per-character width used to center auto-sized text.
const LABEL_CHAR_WIDTH: f32 = 14.0;
const PROMPT_CHAR_WIDTH: f32 = 10.0;

const LABEL_HEIGHT: f32 = 24.0;
const PROMPT_HEIGHT: f32 = 20.0;

struct Step {
    label: &'static str,
    prompt: Option<&'static str>,
}

const STEPS: [Step; 3] = [
    Step {
        label: "Pick an image",
        prompt: None,
    },
    Step {
        label: "Describe the change you want",
        prompt: Some("\"turn it into a watercolor illustration\""),
    },
    Step {
        label: "Keep iterating, explore further",
        prompt: Some("\"add falling cherry blossom petals\""),
    },
];

const TIP_TEXT: &str = "Tip: a new page is a new project - explore freely";

/// A positioned text block in the walkthrough.
pub struct TextBlock {
    pub content: String,
    pub grey: bool,
    pub position: Vec2,
    pub size: Vec2,
}

/// An arrow between two images: start point plus relative end.
pub struct ArrowSpec {
    pub start: Vec2,
    pub end: Vec2,
}

/// The computed walkthrough layout.
pub struct OnboardingLayout {
    pub images: [Bounds; 3],
    pub texts: Vec<TextBlock>,
    pub arrows: Vec<ArrowSpec>,
}

/// Compute the walkthrough layout, centered on the origin.
pub fn layout() -> OnboardingLayout {
    let cell_width = IMAGE_DISPLAY_SIZE + IMAGE_GAP + ARROW_LENGTH;
    let total_width = cell_width * 2.0 + IMAGE_DISPLAY_SIZE;
    let start_x = -total_width / 2.0;

    let images = [0, 1, 2].map(|i| {
        Bounds::from_origin_size(
            Vec2::new(start_x + i as f32 * cell_width, 0.0),
            Vec2::splat(IMAGE_DISPLAY_SIZE),
        )
    });

    let mut texts = Vec::new();
    for (image, step) in images.iter().zip(STEPS.iter()) {
        let center_x = image.center().x;

        let label_width = step.label.chars().count() as f32 * LABEL_CHAR_WIDTH;
        texts.push(TextBlock {
            content: step.label.to_string(),
            grey: false,
            position: Vec2::new(center_x - label_width / 2.0, image.bottom() + 20.0),
            size: Vec2::new(label_width, LABEL_HEIGHT),
        });

        if let Some(prompt) = step.prompt {
            let prompt_width = prompt.chars().count() as f32 * PROMPT_CHAR_WIDTH;
            texts.push(TextBlock {
                content: prompt.to_string(),
                grey: true,
                position: Vec2::new(center_x - prompt_width / 2.0, image.bottom() + 48.0),
                size: Vec2::new(prompt_width, PROMPT_HEIGHT),
            });
        }
    }

    // Closing tip, centered under the whole row.
    let tip_width = TIP_TEXT.chars().count() as f32 * LABEL_CHAR_WIDTH;
    texts.push(TextBlock {
        content: TIP_TEXT.to_string(),
        grey: false,
        position: Vec2::new(-tip_width / 2.0, images[0].bottom() + 90.0),
        size: Vec2::new(tip_width, LABEL_HEIGHT),
    });

    // Arrows between consecutive images, at mid-image height, starting
    // and ending half a gap away from the images they connect.
    let arrows = images
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            let start = Vec2::new(from.right() + IMAGE_GAP / 2.0, from.center().y);
            ArrowSpec {
                start,
                end: Vec2::new(to.left() - IMAGE_GAP / 2.0 - start.x, 0.0),
            }
        })
        .collect();

    OnboardingLayout {
        images,
        texts,
        arrows,
    }
}

/// Insert the walkthrough into a scene and fit the viewport to it.
///
/// `assets` are the three example images, in step order; each is shown
/// at the fixed walkthrough display size regardless of its pixel size.
pub fn seed(scene: &mut Scene, assets: [ImageAsset; 3]) {
    let layout = layout();

    for (image, asset) in layout.images.iter().zip(assets) {
        let asset_id = scene.add_asset(asset);
        scene.add_shape(Shape::image(asset_id, image.origin(), image.size()));
    }

    for text in layout.texts {
        let shape = if text.grey {
            Shape::grey_text(text.content, text.position, text.size)
        } else {
            Shape::text(text.content, text.position, text.size)
        };
        scene.add_shape(shape);
    }

    for arrow in layout.arrows {
        scene.add_shape(Shape::arrow(arrow.start, arrow.end));
    }

    if let Some(bounds) = scene.content_bounds() {
        scene.viewport.zoom_to_fit(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_form_an_evenly_spaced_row_centered_on_the_origin() {
        let layout = layout();

        assert_eq!(layout.images[0].origin(), Vec2::new(-570.0, 0.0));
        assert_eq!(layout.images[1].origin(), Vec2::new(-150.0, 0.0));
        assert_eq!(layout.images[2].origin(), Vec2::new(270.0, 0.0));

        // Row is symmetric around x = 0.
        assert_eq!(layout.images[0].left(), -layout.images[2].right());
        for image in &layout.images {
            assert_eq!(image.size(), Vec2::splat(IMAGE_DISPLAY_SIZE));
        }
    }

    #[test]
    fn arrows_span_the_space_between_images() {
        let layout = layout();
        assert_eq!(layout.arrows.len(), 2);

        let first = &layout.arrows[0];
        assert_eq!(first.start, Vec2::new(-240.0, 150.0));
        assert_eq!(first.end, Vec2::new(ARROW_LENGTH, 0.0));

        let second = &layout.arrows[1];
        assert_eq!(second.start, Vec2::new(180.0, 150.0));
        assert_eq!(second.end, Vec2::new(ARROW_LENGTH, 0.0));
    }

    #[test]
    fn labels_sit_under_their_images_and_prompts_render_grey() {
        let layout = layout();
        // 3 labels + 2 prompts + 1 tip.
        assert_eq!(layout.texts.len(), 6);

        let first_label = &layout.texts[0];
        assert_eq!(first_label.content, "Pick an image");
        assert!(!first_label.grey);
        assert_eq!(first_label.position.y, 320.0);
        // Centered under the first image.
        let image_center = layout.images[0].center().x;
        assert!(
            (first_label.position.x + first_label.size.x / 2.0 - image_center).abs() < 1e-3
        );

        let first_prompt = &layout.texts[2];
        assert!(first_prompt.grey);
        assert_eq!(first_prompt.position.y, 348.0);

        let tip = layout.texts.last().unwrap();
        assert_eq!(tip.position.y, 390.0);
        assert!((tip.position.x + tip.size.x / 2.0).abs() < 1e-3);
    }

    #[test]
    fn seeding_fills_the_scene_and_fits_the_viewport() {
        let mut scene = Scene::new();
        let assets = [0, 1, 2].map(|i| {
            ImageAsset::new(
                format!("onboarding-{}.png", i + 1),
                "data:image/png;base64,AA==",
                1024,
                1024,
                "image/png",
            )
        });
        seed(&mut scene, assets);

        // 3 images + 6 text blocks + 2 arrows.
        assert_eq!(scene.shape_count(), 11);
        assert_eq!(scene.assets().len(), 3);

        // Content is wide enough that the fit stays under the 0.8 cap.
        assert!(scene.viewport.zoom <= 0.8);
        let content = scene.content_bounds().unwrap();
        assert_eq!(scene.viewport.center(), content.center());
    }
}
