//! Current atlas and section storage.
//!
//! Commands resolve "the current atlas" and "the current section" through
//! these traits so the core only ever sees resolved values. Writers replace
//! the whole value; readers get a shared handle to a complete value.
//! `get_*` calls are independent snapshots: two reads may observe values
//! from different writes. Read-modify-write of the section goes through
//! [`SectionRepo::update_section`], which holds the write lock throughout.

use std::sync::{Arc, PoisonError, RwLock};

use burn::tensor::backend::Backend;
use slicereg_core::{Atlas, Section};

use crate::error::{RegistrationError, Result};

/// Holds the current atlas.
pub trait AtlasRepo<B: Backend> {
    /// Current atlas, if one has been loaded.
    fn get_atlas(&self) -> Option<Arc<Atlas<B>>>;

    /// Replace the current atlas.
    fn set_atlas(&self, atlas: Atlas<B>) -> Arc<Atlas<B>>;
}

/// Holds the current section.
pub trait SectionRepo<B: Backend> {
    /// Current section, if one has been loaded.
    fn get_section(&self) -> Option<Arc<Section<B>>>;

    /// Replace the current section, even if it is an updated copy of it.
    fn save_section(&self, section: Section<B>) -> Arc<Section<B>>;

    /// Replace the current section with `update(current)` atomically.
    ///
    /// `NoSectionLoaded` if there is none. An error from `update` leaves the
    /// current section in place.
    fn update_section<F>(&self, update: F) -> Result<Arc<Section<B>>>
    where
        F: FnOnce(&Section<B>) -> Result<Section<B>>;
}

/// In-process repository; one writer at a time, any number of readers.
#[derive(Debug)]
pub struct InMemoryRepo<B: Backend> {
    atlas: RwLock<Option<Arc<Atlas<B>>>>,
    section: RwLock<Option<Arc<Section<B>>>>,
}

impl<B: Backend> Default for InMemoryRepo<B> {
    fn default() -> Self {
        Self {
            atlas: RwLock::new(None),
            section: RwLock::new(None),
        }
    }
}

impl<B: Backend> InMemoryRepo<B> {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the current section.
    pub fn clear_section(&self) {
        *self.section.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn read<T>(slot: &RwLock<Option<Arc<T>>>) -> Option<Arc<T>> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn replace<T>(slot: &RwLock<Option<Arc<T>>>, value: T) -> Arc<T> {
    let value = Arc::new(value);
    *slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&value));
    value
}

impl<B: Backend> AtlasRepo<B> for InMemoryRepo<B> {
    fn get_atlas(&self) -> Option<Arc<Atlas<B>>> {
        read(&self.atlas)
    }

    fn set_atlas(&self, atlas: Atlas<B>) -> Arc<Atlas<B>> {
        replace(&self.atlas, atlas)
    }
}

impl<B: Backend> SectionRepo<B> for InMemoryRepo<B> {
    fn get_section(&self) -> Option<Arc<Section<B>>> {
        read(&self.section)
    }

    fn save_section(&self, section: Section<B>) -> Arc<Section<B>> {
        replace(&self.section, section)
    }

    fn update_section<F>(&self, update: F) -> Result<Arc<Section<B>>>
    where
        F: FnOnce(&Section<B>) -> Result<Section<B>>,
    {
        let mut slot = self.section.write().unwrap_or_else(PoisonError::into_inner);
        let current = slot.as_ref().ok_or(RegistrationError::NoSectionLoaded)?;
        let updated = Arc::new(update(current)?);
        *slot = Some(Arc::clone(&updated));
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use slicereg_core::{Image, PoseUpdate, Volume};

    type TestBackend = NdArray<f32>;

    fn section() -> Section<TestBackend> {
        let channels = Volume::zeros([2, 3, 4], &Default::default()).unwrap();
        Section::new(Image::new(channels, 12.0).unwrap())
    }

    #[test]
    fn test_empty_repo() {
        let repo = InMemoryRepo::<TestBackend>::new();
        assert!(repo.get_atlas().is_none());
        assert!(repo.get_section().is_none());
    }

    #[test]
    fn test_save_overwrites_current_section() {
        let repo = InMemoryRepo::<TestBackend>::new();
        let s = section();
        repo.save_section(s.clone());
        repo.save_section(s.with_resolution(14.0).unwrap());
        assert_eq!(repo.get_section().unwrap().image().resolution_um(), 14.0);

        repo.save_section(s.update_pose(&PoseUpdate::new().x(3.0)));
        let current = repo.get_section().unwrap();
        assert_eq!(current.pose().x, 3.0);
        assert_eq!(current.image().resolution_um(), 12.0);

        repo.clear_section();
        assert!(repo.get_section().is_none());
    }

    #[test]
    fn test_update_section_requires_section() {
        let repo = InMemoryRepo::<TestBackend>::new();
        let err = repo.update_section(|s| Ok(s.clone())).unwrap_err();
        assert_eq!(err, RegistrationError::NoSectionLoaded);
    }

    #[test]
    fn test_failed_update_keeps_section() {
        let repo = InMemoryRepo::<TestBackend>::new();
        repo.save_section(section());
        let err = repo
            .update_section(|s| Ok(s.with_resolution(-1.0)?))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Core(_)));
        assert_eq!(repo.get_section().unwrap().image().resolution_um(), 12.0);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let repo = InMemoryRepo::<TestBackend>::new();
        repo.save_section(section());
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        repo.update_section(|s| {
                            let x = s.pose().x;
                            Ok(s.update_pose(&PoseUpdate::new().x(x + 1.0)))
                        })
                        .unwrap();
                    }
                });
            }
        });
        assert_eq!(repo.get_section().unwrap().pose().x, 200.0);
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let repo = InMemoryRepo::<TestBackend>::new();
        let volume = Volume::zeros([2, 2, 2], &Default::default()).unwrap();
        repo.set_atlas(Atlas::new(volume.clone(), 10.0).unwrap());
        let before = repo.get_atlas().unwrap();
        repo.set_atlas(Atlas::new(volume, 25.0).unwrap());
        assert_eq!(before.resolution_um(), 10.0);
        assert_eq!(repo.get_atlas().unwrap().resolution_um(), 25.0);
    }
}
