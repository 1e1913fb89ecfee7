//! Host adapter: commands, the scene trait and an in-memory scene

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;
use ucxcrate_core::{Error, Result};

use crate::config::CollisionConfig;
use crate::ingest::SourceObject;
use crate::pipeline::{create_bounding_box, create_convex_hull};
use crate::placement::{ProxyKind, ProxyPlacement};

/// User-facing proxy actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    CreateBoundingBox,
    CreateConvexHull,
}

impl Command {
    pub const ALL: [Command; 2] = [Command::CreateBoundingBox, Command::CreateConvexHull];

    /// Menu label shown by the host
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateBoundingBox => "Create Bounding Box",
            Self::CreateConvexHull => "Create Convex Hull",
        }
    }

    pub fn kind(&self) -> ProxyKind {
        match self {
            Self::CreateBoundingBox => ProxyKind::BoundingBox,
            Self::CreateConvexHull => ProxyKind::ConvexHull,
        }
    }

    /// Run the matching pipeline without touching any scene
    pub fn run(&self, source: &SourceObject, config: &CollisionConfig) -> Result<ProxyPlacement> {
        match self {
            Self::CreateBoundingBox => create_bounding_box(source, config),
            Self::CreateConvexHull => create_convex_hull(source, config),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The scene graph a proxy is committed to
pub trait SceneHost {
    /// The object the user picked, if any
    fn active_source(&self) -> Option<SourceObject>;

    /// Add a finished proxy to the scene. Returns the name it was stored under.
    fn commit(&mut self, placement: ProxyPlacement) -> Result<String>;
}

/// Run `command` against the host's active object and commit the result.
///
/// Settings are validated before the selection is looked at, and nothing
/// reaches the host unless every stage succeeded.
///
/// # Errors
///
/// * [`Error::InvalidConfiguration`] for bad settings
/// * [`Error::NoActiveSelection`] when the host has no active object
/// * any geometry error from the pipeline
pub fn execute<H: SceneHost + ?Sized>(
    host: &mut H,
    command: Command,
    config: &CollisionConfig,
) -> Result<String> {
    config.validate()?;
    let source = host.active_source().ok_or(Error::NoActiveSelection)?;
    let placement = command.run(&source, config)?;
    let name = host.commit(placement)?;
    info!(command = %command, source = %source.name, proxy = %name, "proxy committed");
    Ok(name)
}

/// In-memory scene for tests and embedders
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    objects: Vec<SourceObject>,
    active: Option<usize>,
    proxies: Vec<ProxyPlacement>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene holding one object, already active
    pub fn with_active(source: SourceObject) -> Self {
        let mut scene = Self::new();
        scene.add_object(source);
        scene.active = Some(0);
        scene
    }

    /// Add an object without selecting it; returns its index
    pub fn add_object(&mut self, source: SourceObject) -> usize {
        self.objects.push(source);
        self.objects.len() - 1
    }

    /// Make the named object active, or clear the selection with `None`.
    pub fn set_active(&mut self, name: Option<&str>) -> Result<()> {
        self.active = match name {
            None => None,
            Some(name) => Some(
                self.objects
                    .iter()
                    .position(|o| o.name == name)
                    .ok_or_else(|| Error::invalid_data(format!("no object named '{}'", name)))?,
            ),
        };
        Ok(())
    }

    pub fn objects(&self) -> &[SourceObject] {
        &self.objects
    }

    pub fn proxies(&self) -> &[ProxyPlacement] {
        &self.proxies
    }

    pub fn proxy(&self, name: &str) -> Option<&ProxyPlacement> {
        self.proxies.iter().find(|p| p.name == name)
    }

    /// First free name of the form `base`, `base.001`, `base.002`, ...
    fn unique_name(&self, base: &str) -> String {
        let taken: HashSet<&str> = self
            .objects
            .iter()
            .map(|o| o.name.as_str())
            .chain(self.proxies.iter().map(|p| p.name.as_str()))
            .collect();
        if !taken.contains(base) {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{}.{:03}", base, i))
            .find(|candidate| !taken.contains(candidate.as_str()))
            .unwrap_or_else(|| base.to_string())
    }
}

impl SceneHost for MemoryScene {
    fn active_source(&self) -> Option<SourceObject> {
        self.active.and_then(|i| self.objects.get(i)).cloned()
    }

    fn commit(&mut self, mut placement: ProxyPlacement) -> Result<String> {
        placement.name = self.unique_name(&placement.name);
        let name = placement.name.clone();
        self.proxies.push(placement);
        Ok(name)
    }
}
