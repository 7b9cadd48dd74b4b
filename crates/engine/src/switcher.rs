//! The switch/reset engine.
//!
//! `SwitchEngine` owns the in-memory entry list and settings, and is the
//! only writer of the persisted state and of the install root. Callers pull
//! fresh state through [`SwitchEngine::entries`] after each mutating call.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use platswap_file_ops::{
    ProtectedSet, compute_required_files, delete_required_files, ensure_dir,
    install_required_files, move_dir, restore_hidden_files,
};
use platswap_model::constants::EXPANSION_ARCHIVES;
use platswap_model::{Entry, RequiredFiles, Settings, normalize_label};
use platswap_store::StateStore;
use tracing::{debug, info, warn};

use crate::backup::{backup_name, create_backup};
use crate::entries::EntryList;
use crate::traits::{Activation, ActivationSink, InstanceGuard, LaunchError, ProcessLauncher};
use crate::{EngineError, PathLayout};

/// External collaborators the engine calls into.
#[derive(Clone)]
pub struct Collaborators {
    pub sink: Arc<dyn ActivationSink>,
    pub guard: Arc<dyn InstanceGuard>,
    pub launcher: Arc<dyn ProcessLauncher>,
}

/// Which path a run took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing was last-ran; the target's files were installed.
    FirstRun,
    /// Same platform and label as the last-ran entry; no files moved.
    SameLabel,
    /// Same platform with another label; only the save directory changed.
    LabelSwitch,
    /// Another platform; the previous manifest was swapped out.
    PlatformSwitch,
}

/// Result of a successful run: state is committed and the launch worker is
/// started.
#[derive(Debug)]
pub struct RunOutcome {
    pub transition: Transition,
    pub entry: Entry,
    /// Worker thread running the launcher until the program exits.
    pub launch: JoinHandle<Result<(), LaunchError>>,
}

pub struct SwitchEngine {
    store: StateStore,
    entries: EntryList,
    settings: Settings,
    collaborators: Collaborators,
    elevate: bool,
}

impl SwitchEngine {
    /// Loads entries and settings from `store`.
    pub fn open(store: StateStore, collaborators: Collaborators) -> Result<Self, EngineError> {
        let entries = EntryList::from_loaded(store.load_entries()?);
        let settings = store.load_settings()?;
        debug!(entries = entries.as_slice().len(), "engine opened");
        Ok(Self {
            store,
            entries,
            settings,
            collaborators,
            elevate: false,
        })
    }

    /// Requests elevated launches (the process is itself elevated).
    pub fn set_elevate(&mut self, elevate: bool) {
        self.elevate = elevate;
    }

    pub fn entries(&self) -> &[Entry] {
        self.entries.as_slice()
    }

    pub fn last_ran(&self) -> Option<&Entry> {
        self.entries.last_ran()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Current layout, or `RootNotSet`.
    pub fn layout(&self) -> Result<PathLayout, EngineError> {
        PathLayout::from_settings(&self.settings)
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<(), EngineError> {
        self.store.save_settings(&settings)?;
        self.settings = settings;
        Ok(())
    }

    // ---- entry management ----

    /// Adds an entry whose platform directory exists. Returns its index.
    pub fn add(&mut self, entry: Entry) -> Result<usize, EngineError> {
        let layout = self.layout()?;
        if let Some(reason) = entry.invalid_reason() {
            return Err(EngineError::InvalidEntry(reason));
        }
        if self
            .entries
            .contains(&entry.platform, entry.label.as_deref(), None)
        {
            return Err(EngineError::DuplicateEntry(entry.to_string()));
        }
        let platform_dir = layout.platform_dir(&entry.platform);
        if !platform_dir.is_dir() {
            return Err(EngineError::PlatformMissing(platform_dir));
        }
        let index = self.entries.push(entry)?;
        self.save_entries()?;
        info!(entry = %self.entries.as_slice()[index], "entry added");
        Ok(index)
    }

    /// Appends a copy of an entry with an empty platform. Returns its index.
    pub fn copy(&mut self, index: usize) -> Result<usize, EngineError> {
        let copied = self.entries.copy(index)?;
        self.save_entries()?;
        Ok(copied)
    }

    pub fn delete(&mut self, index: usize) -> Result<Entry, EngineError> {
        let removed = self.entries.remove(index)?;
        self.save_entries()?;
        info!(entry = %removed, "entry deleted");
        Ok(removed)
    }

    pub fn move_up(&mut self, index: usize) -> Result<bool, EngineError> {
        let moved = self.entries.move_up(index)?;
        if moved {
            self.save_entries()?;
        }
        Ok(moved)
    }

    pub fn move_down(&mut self, index: usize) -> Result<bool, EngineError> {
        let moved = self.entries.move_down(index)?;
        if moved {
            self.save_entries()?;
        }
        Ok(moved)
    }

    /// Moves an entry before the one at `target` (`target == len` is the end).
    pub fn move_entry(&mut self, source: usize, target: usize) -> Result<bool, EngineError> {
        let moved = self.entries.move_entry(source, target)?;
        if moved {
            self.save_entries()?;
        }
        Ok(moved)
    }

    /// Replaces the entry at `index` with `draft`, renaming platform and
    /// save directories on disk when the platform or label changed.
    pub fn edit(&mut self, index: usize, mut draft: Entry) -> Result<(), EngineError> {
        let old = self
            .entries
            .get(index)
            .cloned()
            .ok_or(EngineError::NoSuchEntry(index))?;
        draft.label = normalize_label(draft.label);

        if let Some(reason) = draft.invalid_reason() {
            return Err(EngineError::InvalidEntry(reason));
        }
        if self
            .entries
            .contains(&draft.platform, draft.label.as_deref(), Some(index))
        {
            return Err(EngineError::DuplicateEntry(draft.to_string()));
        }

        // A copied entry has no platform yet, so there is nothing on disk to
        // rename. Toggling the flag never renames: the directories belong to
        // the isolated storage of the old name. A hand-edited `..` never
        // names a directory of its own.
        let has_platform = !old.platform.trim().is_empty();
        let renamable = has_platform && old.invalid_reason().is_none();
        if renamable && old.was_last_ran == draft.was_last_ran {
            self.rename_on_disk(&old, &draft)?;
        }

        self.entries.replace(index, draft.clone())?;
        if draft.was_last_ran {
            self.entries.mark_last_ran(index)?;
        }

        if has_platform {
            if let Ok(layout) = self.layout() {
                if draft.was_last_ran {
                    self.notify_sink(&layout, &draft);
                } else if self.entries.platform_matches_last_ran(&draft.platform) {
                    if let Some(last) = self.entries.last_ran().cloned() {
                        self.notify_sink(&layout, &last);
                    }
                }
            }
        }

        self.save_entries()?;
        info!(entry = %draft, "entry updated");
        Ok(())
    }

    fn rename_on_disk(&mut self, old: &Entry, draft: &Entry) -> Result<(), EngineError> {
        let platform_changed = !old.same_platform(draft);
        let label_changed = !old.same_label(draft);
        if !platform_changed && !label_changed {
            return Ok(());
        }

        let layout = self.layout()?;
        let new_platform_dir = layout.platform_dir(&draft.platform);
        if platform_changed && new_platform_dir.exists() {
            return Err(EngineError::PlatformExists(new_platform_dir));
        }
        if old.label.is_some() && draft.label.is_none() {
            return Err(EngineError::LabelRemoval);
        }
        let new_platform_saves = layout.platform_save_dir(&draft.platform);
        if platform_changed && new_platform_saves.exists() {
            return Err(EngineError::SaveDirExists(new_platform_saves));
        }
        let new_save_dir = layout.save_dir(draft);
        if new_save_dir.exists() {
            return Err(EngineError::SaveDirExists(new_save_dir));
        }
        if draft.was_last_ran && self.collaborators.guard.is_running() {
            return Err(EngineError::GameRunning);
        }

        if platform_changed {
            let old_platform_dir = layout.platform_dir(&old.platform);
            if old_platform_dir.is_dir() {
                move_dir(&old_platform_dir, &new_platform_dir)?;
            }
            let old_platform_saves = layout.platform_save_dir(&old.platform);
            if old_platform_saves.is_dir() {
                move_dir(&old_platform_saves, &new_platform_saves)?;
            }
            let renamed = self.entries.rename_platform(&old.platform, &draft.platform);
            info!(from = %old.platform, to = %draft.platform, renamed, "platform renamed");
        }

        // Going from no label to a label only points this entry at a new,
        // empty save directory; the unlabelled saves stay with their siblings.
        if label_changed && old.label.is_some() {
            let moved_old = Entry {
                platform: draft.platform.clone(),
                ..old.clone()
            };
            let old_save_dir = layout.save_dir(&moved_old);
            if old_save_dir.is_dir() {
                move_dir(&old_save_dir, &new_save_dir)?;
            }
            let renamed = self.entries.rename_label(
                &draft.platform,
                old.label.as_deref(),
                draft.label.as_deref(),
            );
            info!(platform = %draft.platform, renamed, "label renamed");
        }
        Ok(())
    }

    // ---- switching ----

    /// Switches the install root to the entry at `index` and launches it.
    ///
    /// All state is persisted before the launch worker starts. A failed
    /// file swap returns an error without touching the flags; the persisted
    /// manifest still describes what to remove on the next attempt.
    pub fn run(&mut self, index: usize) -> Result<RunOutcome, EngineError> {
        let layout = self.layout()?;
        let target = self
            .entries
            .get(index)
            .cloned()
            .ok_or(EngineError::NoSuchEntry(index))?;
        if target.platform.trim().is_empty() {
            return Err(EngineError::EmptyPlatform);
        }
        // Entries.json may be edited by hand.
        if let Some(reason) = target.invalid_reason() {
            return Err(EngineError::InvalidEntry(reason));
        }
        let platform_dir = layout.platform_dir(&target.platform);
        if !platform_dir.is_dir() {
            return Err(EngineError::PlatformMissing(platform_dir));
        }

        let last = self.entries.last_ran().cloned();
        let transition = match &last {
            None => {
                info!(entry = %target, "no version was ever ran, installing it");
                self.swap_files(&layout, &target, &target)?;
                Transition::FirstRun
            }
            Some(last) if last.same_platform(&target) => {
                if last.same_label(&target) {
                    info!(entry = %target, "running the same platform and label");
                    Transition::SameLabel
                } else {
                    info!(from = %last, to = %target, "same platform, different label");
                    self.refuse_if_running()?;
                    Transition::LabelSwitch
                }
            }
            Some(last) => {
                info!(from = %last, to = %target, "switching platforms");
                self.refuse_if_running()?;
                self.swap_files(&layout, last, &target)?;
                Transition::PlatformSwitch
            }
        };

        self.entries.mark_last_ran(index)?;
        self.notify_sink(&layout, &target);
        self.save_entries()?;

        let launch = self.launch(&layout, &target)?;
        Ok(RunOutcome {
            transition,
            entry: target,
            launch,
        })
    }

    /// Removes the last installed manifest from the root and clears the
    /// last-ran marker. Returns the entry that was last-ran.
    pub fn reset(&mut self) -> Result<Entry, EngineError> {
        warn!("resetting directory");
        let layout = self.layout()?;
        self.refuse_if_running()?;
        let last = self
            .entries
            .last_ran()
            .cloned()
            .ok_or(EngineError::NothingToReset)?;

        let protected = self.protected(&layout);
        let manifest = self.last_manifest(&layout, &last, &protected)?;
        if !manifest.is_empty() {
            delete_required_files(layout.root(), &manifest, &protected)?;
        }
        self.store.save_manifest(&RequiredFiles::empty())?;
        restore_hidden_files(layout.root(), EXPANSION_ARCHIVES)?;

        self.entries.clear_last_ran();
        self.save_entries()?;
        info!(entry = %last, "directory reset");
        Ok(last)
    }

    /// Creates a timestamped backup of platforms, saves and state files.
    pub fn backup(&self) -> Result<PathBuf, EngineError> {
        let layout = self.layout()?;
        let name = backup_name(chrono::Local::now().naive_local());
        create_backup(
            &layout,
            &self.store,
            self.collaborators.guard.as_ref(),
            &name,
        )
    }

    fn refuse_if_running(&self) -> Result<(), EngineError> {
        if self.collaborators.guard.is_running() {
            warn!("the game is still running");
            return Err(EngineError::GameRunning);
        }
        Ok(())
    }

    fn protected(&self, layout: &PathLayout) -> ProtectedSet {
        ProtectedSet::new().with_extra(layout.backups_name_in_root())
    }

    /// The persisted manifest, or a recomputation from `last`'s platform
    /// directory when none was ever written. The recomputation reflects the
    /// directory as it is now, which may differ from what was installed.
    fn last_manifest(
        &self,
        layout: &PathLayout,
        last: &Entry,
        protected: &ProtectedSet,
    ) -> Result<RequiredFiles, EngineError> {
        match self.store.load_manifest()? {
            Some(manifest) => Ok(manifest),
            None => {
                if let Some(reason) = last.invalid_reason() {
                    return Err(EngineError::InvalidEntry(reason));
                }
                warn!(entry = %last, "no last required files recorded, using the platform directory as a basis");
                Ok(compute_required_files(
                    &layout.platform_dir(&last.platform),
                    protected,
                )?)
            }
        }
    }

    fn swap_files(
        &self,
        layout: &PathLayout,
        previous: &Entry,
        target: &Entry,
    ) -> Result<(), EngineError> {
        let protected = self.protected(layout);
        let previous_manifest = self.last_manifest(layout, previous, &protected)?;
        let platform_dir = layout.platform_dir(&target.platform);
        let target_manifest = compute_required_files(&platform_dir, &protected)?;

        let deleted = delete_required_files(layout.root(), &previous_manifest, &protected)?;
        let installed =
            install_required_files(&platform_dir, layout.root(), &target_manifest, &protected)?;
        self.store.save_manifest(&target_manifest)?;
        info!(deleted, installed, platform = %target.platform, "files switched");
        Ok(())
    }

    fn notify_sink(&self, layout: &PathLayout, entry: &Entry) {
        let activation = Activation {
            entry: entry.clone(),
            save_dir: layout.save_dir(entry),
            root_dir: layout.root().to_path_buf(),
        };
        if let Err(e) = self.collaborators.sink.update(&activation) {
            warn!(error = %e, entry = %entry, "failed to update activation sink");
        }
    }

    fn launch(
        &self,
        layout: &PathLayout,
        entry: &Entry,
    ) -> Result<JoinHandle<Result<(), LaunchError>>, EngineError> {
        // The game writes to a `Save` folder in the root when the configured
        // save path is missing.
        ensure_dir(&layout.save_dir(entry))?;
        restore_hidden_files(layout.root(), EXPANSION_ARCHIVES)?;

        let program = layout.launcher_path(entry);
        if !program.is_file() {
            return Err(EngineError::LauncherMissing(program));
        }

        let launcher = Arc::clone(&self.collaborators.launcher);
        let flags = entry.flags.clone();
        let elevate = self.elevate;
        info!(program = %program.display(), flags = %flags, "launching");
        std::thread::Builder::new()
            .name("platswap-launch".into())
            .spawn(move || {
                let result = launcher.launch(&program, &flags, elevate);
                if let Err(e) = &result {
                    tracing::error!(error = %e, "launch failed");
                }
                result
            })
            .map_err(EngineError::LaunchThread)
    }

    fn save_entries(&self) -> Result<(), EngineError> {
        self.store.save_entries(self.entries.as_slice())?;
        Ok(())
    }
}
