use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    assets::{ResourceCatalog, StockResources},
    error::{VfxError, VfxResult},
    format::SequenceFile,
    sequence::{EmitterSlot, MeshInstance, Sequence},
};

/// Default directory sequence files live in.
pub const DEFAULT_SEQUENCE_DIR: &str = "data/vfx";
/// Extension of persisted sequence files.
pub const SEQUENCE_FILE_EXT: &str = "vfxseq";

/// Name of the built-in template a missing sequence file is seeded from.
const DEFAULT_TEMPLATE: &str = "default";
/// How many disambiguated backup filenames a failed save falls back through.
const SAVE_FALLBACK_ATTEMPTS: usize = 128;

/// Owns every loaded [`Sequence`] and its persisted representation.
///
/// Sequences are identified by a stable index assigned at creation; indices
/// are never invalidated by later creations.
pub struct SequenceStore {
    root: PathBuf,
    catalog: Box<dyn ResourceCatalog>,
    sequences: Vec<Sequence>,
}

impl SequenceStore {
    pub fn new(root: impl Into<PathBuf>, catalog: Box<dyn ResourceCatalog>) -> Self {
        Self {
            root: root.into(),
            catalog,
            sequences: Vec::new(),
        }
    }

    pub fn with_stock_resources(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Box::new(StockResources))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn sequence(&self, index: usize) -> VfxResult<&Sequence> {
        self.sequences
            .get(index)
            .ok_or_else(|| VfxError::store(format!("no sequence at index {index}")))
    }

    pub fn sequence_mut(&mut self, index: usize) -> VfxResult<&mut Sequence> {
        self.sequences
            .get_mut(index)
            .ok_or_else(|| VfxError::store(format!("no sequence at index {index}")))
    }

    /// Appends a new sequence under `name` and loads its persisted data,
    /// seeding the file from the default template when it does not exist
    /// yet. Returns the new stable index.
    pub fn create_sequence(&mut self, name: &str) -> VfxResult<usize> {
        let index = self.sequences.len();
        let mut sq = Sequence::new(index);
        sq.name = name.to_string();
        self.sequences.push(sq);
        if let Err(err) = self.load(index, name) {
            self.sequences.pop();
            return Err(err);
        }
        Ok(index)
    }

    /// Find-or-create: resolves a name to its index, materializing the
    /// sequence (and its file) when it is not loaded yet.
    pub fn index_from_name(&mut self, name: &str) -> VfxResult<usize> {
        if let Some(sq) = self.sequences.iter().find(|sq| sq.name == name) {
            return Ok(sq.index());
        }
        self.create_sequence(name)
    }

    /// Reloads the sequence at `index` from the file keyed by `name`,
    /// replacing its meshes, emitters and timestamps in place. A missing
    /// file is seeded from the default template first; a missing template
    /// is a hard error.
    pub fn load(&mut self, index: usize, name: &str) -> VfxResult<()> {
        let path = self.sequence_path(name);
        if !path.exists() {
            let template = self.sequence_path(DEFAULT_TEMPLATE);
            fs::copy(&template, &path).map_err(|err| {
                VfxError::store(format!(
                    "default sequence template '{}' is unavailable: {err}",
                    template.display()
                ))
            })?;
            tracing::info!(sequence = name, "seeded new sequence file from template");
        }

        let text = fs::read_to_string(&path)?;
        let file: SequenceFile = serde_json::from_str(&text)
            .map_err(|err| VfxError::serde(format!("parse '{}': {err}", path.display())))?;

        let sq = self.sequence_mut(index)?;
        file.apply_to(sq)?;
        sq.validate()?;
        tracing::debug!(sequence = %sq.name, index, "loaded sequence");
        Ok(())
    }

    /// Serializes the sequence at `index` to its file. On a write failure
    /// the store falls back through up to 128 disambiguated backup
    /// filenames before giving up; playback state is never affected either
    /// way. Returns the path actually written.
    pub fn save(&self, index: usize) -> VfxResult<PathBuf> {
        let sq = self.sequence(index)?;
        let file = SequenceFile::from_sequence(sq);
        let json = serde_json::to_string_pretty(&file)
            .map_err(|err| VfxError::serde(format!("serialize '{}': {err}", sq.name)))?;

        let primary = self.sequence_path(&sq.name);
        match fs::write(&primary, &json) {
            Ok(()) => return Ok(primary),
            Err(err) => {
                tracing::error!(
                    sequence = %sq.name,
                    index,
                    path = %primary.display(),
                    %err,
                    "failed to save sequence, trying backup filenames"
                );
            }
        }

        for i in 0..SAVE_FALLBACK_ATTEMPTS {
            let backup = self
                .root
                .join(format!("{}backupSave_{i}.{SEQUENCE_FILE_EXT}", sq.name));
            if fs::write(&backup, &json).is_ok() {
                tracing::warn!(
                    sequence = %sq.name,
                    path = %backup.display(),
                    "sequence saved to backup filename"
                );
                return Ok(backup);
            }
        }

        tracing::error!(sequence = %sq.name, index, "abandoning save, all backup filenames failed");
        Err(VfxError::store(format!(
            "could not save sequence '{}' to '{}' or any backup filename",
            sq.name,
            primary.display()
        )))
    }

    /// Appends a default-initialized mesh instance to the sequence at
    /// `index`, wired from the resource catalog.
    pub fn add_mesh_instance(&mut self, index: usize) -> VfxResult<usize> {
        let model = self.catalog.default_model();
        let sq = self
            .sequences
            .get_mut(index)
            .ok_or_else(|| VfxError::store(format!("no sequence at index {index}")))?;
        sq.meshes.push(MeshInstance::new(model));
        Ok(sq.meshes.len() - 1)
    }

    /// Appends a default-initialized emitter slot to the sequence at
    /// `index`, wired from the resource catalog.
    pub fn add_emitter_slot(&mut self, index: usize) -> VfxResult<usize> {
        let config = self.catalog.default_emitter();
        let sq = self
            .sequences
            .get_mut(index)
            .ok_or_else(|| VfxError::store(format!("no sequence at index {index}")))?;
        sq.emitters.push(EmitterSlot::new(config));
        Ok(sq.emitters.len() - 1)
    }

    pub fn sequence_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{SEQUENCE_FILE_EXT}"))
    }
}

#[cfg(test)]
impl SequenceStore {
    /// Registers a prebuilt sequence without touching the disk. The
    /// sequence's index must match its position in the store.
    pub(crate) fn push_for_tests(&mut self, sq: Sequence) {
        assert_eq!(sq.index(), self.sequences.len());
        self.sequences.push(sq);
    }
}
