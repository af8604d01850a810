use crate::model::{ArtworkId, EmotionLabel};
use serde::{Deserialize, Serialize};

/// Immutable catalog entry. Fixed at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    pub title: String,
    pub emotions: Vec<EmotionLabel>,
}

impl Artwork {
    pub fn new(id: ArtworkId, title: &str, emotions: &[&str]) -> Self {
        Self {
            id,
            title: title.to_string(),
            emotions: emotions.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn has_emotion(&self, emotion: &str) -> bool {
        self.emotions.iter().any(|e| e == emotion)
    }
}

/// Ordered list of artworks shown in the gallery
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    artworks: Vec<Artwork>,
}

impl Catalog {
    pub fn new(artworks: Vec<Artwork>) -> Self {
        Self { artworks }
    }

    pub fn artworks(&self) -> &[Artwork] {
        &self.artworks
    }

    pub fn get(&self, id: ArtworkId) -> Option<&Artwork> {
        self.artworks.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.artworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artworks.is_empty()
    }

    /// Artwork after `id` in gallery order, wrapping from last to first
    pub fn next_id(&self, id: ArtworkId) -> Option<ArtworkId> {
        let index = self.position(id)?;
        let next = if index + 1 == self.artworks.len() { 0 } else { index + 1 };
        Some(self.artworks[next].id)
    }

    /// Artwork before `id` in gallery order, wrapping from first to last
    pub fn previous_id(&self, id: ArtworkId) -> Option<ArtworkId> {
        let index = self.position(id)?;
        let previous = if index == 0 { self.artworks.len() - 1 } else { index - 1 };
        Some(self.artworks[previous].id)
    }

    fn position(&self, id: ArtworkId) -> Option<usize> {
        self.artworks.iter().position(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> Catalog {
        Catalog::new(vec![
            Artwork::new(1, "One", &["Calm"]),
            Artwork::new(2, "Two", &["Warm", "Curious"]),
            Artwork::new(5, "Five", &["Joyful"]),
        ])
    }

    #[test]
    fn test_navigation_wraps_around() {
        let catalog = small_catalog();
        assert_eq!(catalog.next_id(1), Some(2));
        assert_eq!(catalog.next_id(5), Some(1));
        assert_eq!(catalog.previous_id(1), Some(5));
        assert_eq!(catalog.previous_id(2), Some(1));
        assert_eq!(catalog.next_id(42), None);
    }

    #[test]
    fn test_single_artwork_navigates_to_itself() {
        let catalog = Catalog::new(vec![Artwork::new(9, "Solo", &["Calm"])]);
        assert_eq!(catalog.next_id(9), Some(9));
        assert_eq!(catalog.previous_id(9), Some(9));
    }

    #[test]
    fn test_vocabulary_lookup() {
        let catalog = small_catalog();
        let artwork = catalog.get(2).unwrap();
        assert!(artwork.has_emotion("Curious"));
        assert!(!artwork.has_emotion("Calm"));
        assert!(catalog.get(3).is_none());
    }
}
