use std::fs;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{BinBytesRecorder, FullPrecisionSettings, Recorder};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CheckpointError;
use crate::net::NetBuilder;

/// Which architecture produced a checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetKind {
    Boltzmann,
    Gaussian,
}

impl NetKind {
    pub fn label(self) -> &'static str {
        match self {
            NetKind::Boltzmann => "boltzmann",
            NetKind::Gaussian => "gaussian",
        }
    }
}

/// Architecture fingerprint stored alongside the weights. Weight records do
/// not describe the module that produced them, so restoring validates this
/// fingerprint before rebuilding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub kind: NetKind,
    pub input_dim: usize,
    pub n_outputs: usize,
}

impl CheckpointMetadata {
    pub fn new(kind: NetKind, input_dim: usize, n_outputs: usize) -> Self {
        Self {
            kind,
            input_dim,
            n_outputs,
        }
    }

    fn ensure_matches(&self, expected: &CheckpointMetadata) -> Result<(), CheckpointError> {
        if self.kind != expected.kind {
            return Err(CheckpointError::KindMismatch {
                expected: expected.kind.label(),
                found: self.kind.label(),
            });
        }
        if self.input_dim != expected.input_dim || self.n_outputs != expected.n_outputs {
            return Err(CheckpointError::DimensionMismatch {
                expected: (expected.input_dim, expected.n_outputs),
                found: (self.input_dim, self.n_outputs),
            });
        }
        Ok(())
    }
}

/// Serialized network: fingerprint plus raw weight-record bytes.
#[derive(Serialize, Deserialize)]
pub struct Checkpoint {
    pub metadata: CheckpointMetadata,
    pub weights: Vec<u8>,
}

/// Optional on-disk location for a policy's weights.
#[derive(Clone, Debug, Default)]
pub struct ModelFile {
    path: Option<PathBuf>,
}

impl ModelFile {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the checkpoint; silently succeeds when no path is configured.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        let bytes = bincode::serde::encode_to_vec(checkpoint, bincode::config::standard())?;
        fs::write(path, bytes)?;
        debug!("wrote checkpoint to {}", path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Checkpoint, CheckpointError> {
        let path = self.path().ok_or(CheckpointError::NoPath)?;
        let bytes = fs::read(path)?;
        let (checkpoint, _): (Checkpoint, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
        Ok(checkpoint)
    }
}

/// Records a module's parameters into a portable checkpoint.
pub fn snapshot<B, M>(net: &M, metadata: CheckpointMetadata) -> Result<Checkpoint, CheckpointError>
where
    B: Backend,
    M: Module<B>,
{
    let record = net.clone().into_record();
    let weights = BinBytesRecorder::<FullPrecisionSettings>::new().record(record, ())?;
    Ok(Checkpoint { metadata, weights })
}

/// Loads a checkpoint, validates its fingerprint, rebuilds the module with
/// the given builder, and applies the stored parameters.
pub fn restore_net<B, N>(
    file: &ModelFile,
    expected: &CheckpointMetadata,
    rebuild: NetBuilder<N>,
) -> Result<N, CheckpointError>
where
    B: Backend,
    B::Device: Default,
    N: Module<B>,
{
    let checkpoint = file.load()?;
    checkpoint.metadata.ensure_matches(expected)?;
    let device = B::Device::default();
    let record = BinBytesRecorder::<FullPrecisionSettings>::new()
        .load::<N::Record>(checkpoint.weights, &device)?;
    Ok(rebuild(expected.input_dim, expected.n_outputs).load_record(record))
}
