//! User playlists persisted as a single JSON document

use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::content::Track;
use super::store::{read_json, write_json, StoreError, StoreResult};

const PLAYLISTS_FILE: &str = "playlists.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub tracks: Vec<Track>,
}

#[derive(Clone)]
pub struct PlaylistStore {
    path: PathBuf,
    playlists: Arc<RwLock<Vec<Playlist>>>,
}

impl PlaylistStore {
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let path = data_dir.join(PLAYLISTS_FILE);
        let playlists: Vec<Playlist> = read_json(&path)?;
        tracing::debug!(count = playlists.len(), "Playlist store loaded");
        Ok(Self {
            path,
            playlists: Arc::new(RwLock::new(playlists)),
        })
    }

    pub async fn list(&self, owner: Uuid) -> Vec<Playlist> {
        self.playlists
            .read()
            .await
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<Playlist> {
        self.playlists.read().await.iter().find(|p| p.id == id).cloned()
    }

    pub async fn create(&self, owner: Uuid, name: &str) -> StoreResult<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let playlist = Playlist {
            id: Uuid::new_v4(),
            owner,
            name: name.to_string(),
            tracks: Vec::new(),
        };

        let mut playlists = self.playlists.write().await;
        let mut updated = playlists.clone();
        updated.push(playlist.clone());
        write_json(&self.path, &updated)?;
        *playlists = updated;
        tracing::info!(playlist_id = %playlist.id, name = %playlist.name, "Playlist created");
        Ok(playlist)
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut playlists = self.playlists.write().await;
        let mut updated = playlists.clone();
        updated.retain(|p| p.id != id);
        if updated.len() == playlists.len() {
            return Err(StoreError::NotFound("playlist"));
        }
        write_json(&self.path, &updated)?;
        *playlists = updated;
        Ok(())
    }

    /// Append a track; a track already in the playlist is not added twice
    pub async fn add_track(&self, id: Uuid, track: Track) -> StoreResult<bool> {
        self.modify(id, |playlist| {
            if playlist.tracks.iter().any(|t| t.id == track.id) {
                false
            } else {
                playlist.tracks.push(track);
                true
            }
        })
        .await
    }

    pub async fn remove_track(&self, id: Uuid, track_id: &str) -> StoreResult<bool> {
        self.modify(id, |playlist| {
            let before = playlist.tracks.len();
            playlist.tracks.retain(|t| t.id != track_id);
            playlist.tracks.len() != before
        })
        .await
    }

    /// Apply `f` to a copy; memory only changes once the copy is on disk
    async fn modify<F>(&self, id: Uuid, f: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut Playlist) -> bool,
    {
        let mut playlists = self.playlists.write().await;
        let mut updated = playlists.clone();
        let playlist = updated
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound("playlist"))?;
        let changed = f(playlist);
        if changed {
            write_json(&self.path, &updated)?;
            *playlists = updated;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Song {id}"),
            thumbnail_url: String::new(),
        }
    }

    #[tokio::test]
    async fn playlists_are_scoped_to_owner() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::open(dir.path()).unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.create(alice, "Morning").await.unwrap();
        store.create(bob, "Night").await.unwrap();

        let names: Vec<String> = store.list(alice).await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Morning".to_string()]);
    }

    #[tokio::test]
    async fn tracks_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::open(dir.path()).unwrap();
        let owner = Uuid::new_v4();
        let playlist = store.create(owner, "Mix").await.unwrap();

        assert!(store.add_track(playlist.id, track("a")).await.unwrap());
        assert!(store.add_track(playlist.id, track("b")).await.unwrap());
        assert!(!store.add_track(playlist.id, track("a")).await.unwrap());
        assert!(store.remove_track(playlist.id, "a").await.unwrap());

        let reopened = PlaylistStore::open(dir.path()).unwrap();
        let loaded = reopened.get(playlist.id).await.unwrap();
        assert_eq!(loaded.tracks, vec![track("b")]);
    }

    #[tokio::test]
    async fn missing_playlists_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::open(dir.path()).unwrap();

        let err = store.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound("playlist")));
        assert!(matches!(
            store.create(Uuid::new_v4(), "   ").await,
            Err(StoreError::EmptyName)
        ));
    }

    #[tokio::test]
    async fn failed_writes_leave_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::open(dir.path()).unwrap();
        let owner = Uuid::new_v4();
        let playlist = store.create(owner, "Kept").await.unwrap();
        store.add_track(playlist.id, track("a")).await.unwrap();

        // Swap the file for a directory so every later write fails
        std::fs::remove_file(dir.path().join(PLAYLISTS_FILE)).unwrap();
        std::fs::create_dir(dir.path().join(PLAYLISTS_FILE)).unwrap();

        assert!(matches!(store.create(owner, "Lost").await, Err(StoreError::Io(_))));
        assert!(store.add_track(playlist.id, track("b")).await.is_err());
        assert!(store.remove_track(playlist.id, "a").await.is_err());
        assert!(store.delete(playlist.id).await.is_err());

        let remaining = store.list(owner).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].tracks, vec![track("a")]);
    }
}
