use crate::model::{Artwork, Catalog};
use crate::store::traits::CountStore;
use anyhow::Result;
use log::{info, warn};

/// The oil-painting gallery, in display order
pub fn gallery_catalog() -> Catalog {
    Catalog::new(vec![
        Artwork::new(1, "Crimson Dreams", &["Calm", "Mysterious", "Nostalgic"]),
        Artwork::new(2, "Ocean Whispers", &["Solitary", "Accepting"]),
        Artwork::new(3, "Golden Horizon", &["Hopeful", "Curious", "Warm"]),
        Artwork::new(4, "Midnight Bloom", &["Wondering", "Mysterious"]),
        Artwork::new(5, "Summer Glow", &["Joyful", "Energetic", "Loving"]),
        Artwork::new(6, "Forest Song", &["Reflective", "Resilient"]),
        Artwork::new(7, "Velvet Night", &["Contemplative", "Intimate"]),
        Artwork::new(8, "Desert Bloom", &["Romantic", "Harmonious"]),
        Artwork::new(9, "Azure Dreams", &["Relaxed", "Connected"]),
        Artwork::new(10, "Autumn Reverie", &["Chaotic", "Unsettling"]),
        Artwork::new(11, "Dawn Breaking", &["Connected", "Warm"]),
        Artwork::new(12, "Ethereal Mist", &["Playful", "Quirky"]),
        Artwork::new(13, "Untitled No. 13", &["Energetic", "Optimistic"]),
        Artwork::new(14, "Untitled No. 14", &["Reflective", "Warm"]),
        Artwork::new(15, "Untitled No. 15", &["Happy", "Hopeful"]),
        Artwork::new(16, "Untitled No. 16", &["Passionate", "Curious"]),
    ])
}

/// Make sure every (artwork, emotion) counter exists.
///
/// Applies a zero delta, so existing counts are left untouched. Individual
/// failures are logged and counted; returns how many counters are ready.
pub async fn load_seed_data<S: CountStore>(store: &S, catalog: &Catalog) -> Result<usize> {
    let mut ready = 0;
    let mut failed = 0;

    for artwork in catalog.artworks() {
        for emotion in &artwork.emotions {
            match store.adjust_count(artwork.id, emotion, 0).await {
                Ok(count) => {
                    info!("Initialized {} for painting {} (count {})", emotion, artwork.id, count);
                    ready += 1;
                }
                Err(e) => {
                    warn!("Error initializing {} for painting {}: {:#}", emotion, artwork.id, e);
                    failed += 1;
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} emotion counters failed to initialize", failed, ready + failed);
    }
    Ok(ready)
}
