use qgs_core_types::{RequestId, TraceId};
use thiserror::Error;

use crate::model::{Mode, ObjectKind};

/// Result type alias using QgsError
pub type Result<T> = std::result::Result<T, QgsError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// test assertions, and operator reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Preconditions
    InvalidInput,
    NotFound,
    WrongObjectType,
    WrongMode,
    EmptySelection,
    InsufficientSelection,
    AlreadyExists,
    CycleDetected,

    // Mid-operation failures
    Aborted,

    // Integrity
    InvariantViolation,

    // Integration/IO
    Io,
    Serialization,
    ExternalService,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::WrongObjectType => "ERR_WRONG_OBJECT_TYPE",
            ExErrorKind::WrongMode => "ERR_WRONG_MODE",
            ExErrorKind::EmptySelection => "ERR_EMPTY_SELECTION",
            ExErrorKind::InsufficientSelection => "ERR_INSUFFICIENT_SELECTION",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::Aborted => "ERR_ABORTED",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether the kind describes a failed precondition (nothing was mutated)
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ExErrorKind::InvalidInput
                | ExErrorKind::NotFound
                | ExErrorKind::WrongObjectType
                | ExErrorKind::WrongMode
                | ExErrorKind::EmptySelection
                | ExErrorKind::InsufficientSelection
                | ExErrorKind::AlreadyExists
                | ExErrorKind::CycleDetected
        )
    }
}

/// Canonical structured error type
///
/// Structured representation with classification fields for programmatic
/// handling and scene context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (object, bone or backup name)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for tool operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QgsError {
    // ===== Preconditions =====
    /// Object is not present in the scene (stale name or never existed)
    #[error("Object not found: {name}")]
    ObjectNotFound { name: String },

    /// Data block referenced by an object is missing
    #[error("Data block not found: {name}")]
    DataNotFound { name: String },

    /// Object has the wrong kind for the operation
    #[error("Object {name} has type {found}, expected {expected}")]
    WrongObjectType {
        name: String,
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// Operation is illegal in the current mode
    #[error("Operation requires {expected} mode, scene is in {found} mode")]
    WrongMode { expected: Mode, found: Mode },

    /// No active object to operate on
    #[error("No active object")]
    NoActiveObject,

    /// Operation targets an object that is not the active one
    #[error("Object {name} is not the active object")]
    NotActive { name: String },

    /// Nothing relevant is selected
    #[error("Nothing selected: {what}")]
    EmptySelection { what: String },

    /// Fewer items selected than the operation needs
    #[error("Need at least {required} selected {what}, found {found}")]
    InsufficientSelection {
        what: String,
        required: usize,
        found: usize,
    },

    /// Mesh has no vertex groups to partition by
    #[error("Mesh object {object} has no vertex groups")]
    NoVertexGroups { object: String },

    /// Vertex group is missing on the mesh
    #[error("Vertex group {group} not found on {object}")]
    VertexGroupNotFound { object: String, group: String },

    /// Bone is missing in the armature
    #[error("Bone {bone} not found in armature {armature}")]
    BoneNotFound { armature: String, bone: String },

    /// Armature has no active bone
    #[error("Armature {armature} has no active bone")]
    NoActiveBone { armature: String },

    /// Setting a parent would create a cycle in the bone tree
    #[error("Cycle detected: parenting would create a loop at bone {bone}")]
    CycleDetected { bone: String },

    /// Join was requested with a single object
    #[error("Join needs an active mesh and at least one other selected mesh")]
    JoinNeedsMultiple,

    /// Requested backup record is not live
    #[error("Backup not found: {id}")]
    BackupNotFound { id: String },

    /// A live backup record already occupies the slot
    #[error("A backup is already pending ({id}); revert before separating again")]
    BackupAlreadyExists { id: String },

    // ===== Mid-operation failures =====
    /// The shrinking source object was lost while partitioning
    #[error("Partition of {object} aborted at group {group}: {reason}")]
    PartitionAborted {
        object: String,
        group: String,
        reason: String,
    },

    /// A revert phase failed; later phases were not run
    #[error("Revert failed during {phase} after completing {completed:?}: {reason}")]
    RevertPhaseFailed {
        phase: String,
        completed: Vec<String>,
        reason: String,
    },

    // ===== Integrity =====
    /// Scene structure violates an invariant
    #[error("Scene invariant violated: {reason}")]
    InvariantViolation { reason: String },

    // ===== Generic =====
    /// Serialization error (JSON encoding/decoding of custom properties)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl QgsError {
    /// Whether this error is a precondition violation (no scene mutation)
    pub fn is_precondition(&self) -> bool {
        ExError::from(self.clone()).kind().is_precondition()
    }
}

impl From<QgsError> for ExError {
    fn from(err: QgsError) -> Self {
        let message = err.to_string();
        match err {
            QgsError::ObjectNotFound { name } | QgsError::DataNotFound { name } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(name)
                    .with_message(message)
            }

            QgsError::WrongObjectType { name, .. } => ExError::new(ExErrorKind::WrongObjectType)
                .with_entity_id(name)
                .with_message(message),

            QgsError::WrongMode { .. } => ExError::new(ExErrorKind::WrongMode).with_message(message),

            QgsError::NoActiveObject => {
                ExError::new(ExErrorKind::EmptySelection).with_message(message)
            }

            QgsError::NotActive { name } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(name)
                .with_message(message),

            QgsError::EmptySelection { .. } => {
                ExError::new(ExErrorKind::EmptySelection).with_message(message)
            }

            QgsError::InsufficientSelection { .. } | QgsError::JoinNeedsMultiple => {
                ExError::new(ExErrorKind::InsufficientSelection).with_message(message)
            }

            QgsError::NoVertexGroups { object } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(object)
                .with_message(message),

            QgsError::VertexGroupNotFound { object, .. } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(object)
                .with_message(message),

            QgsError::BoneNotFound { bone, .. } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(bone)
                .with_message(message),

            QgsError::NoActiveBone { armature } => ExError::new(ExErrorKind::EmptySelection)
                .with_entity_id(armature)
                .with_message(message),

            QgsError::CycleDetected { bone } => ExError::new(ExErrorKind::CycleDetected)
                .with_entity_id(bone)
                .with_message(message),

            QgsError::BackupNotFound { id } => ExError::new(ExErrorKind::NotFound)
                .with_op("restore_backup")
                .with_entity_id(id)
                .with_message(message),

            QgsError::BackupAlreadyExists { id } => ExError::new(ExErrorKind::AlreadyExists)
                .with_op("capture_backup")
                .with_entity_id(id)
                .with_message(message),

            QgsError::PartitionAborted { object, .. } => ExError::new(ExErrorKind::Aborted)
                .with_op("partition")
                .with_entity_id(object)
                .with_message(message),

            QgsError::RevertPhaseFailed { .. } => ExError::new(ExErrorKind::Aborted)
                .with_op("revert_all")
                .with_message(message),

            QgsError::InvariantViolation { .. } => {
                ExError::new(ExErrorKind::InvariantViolation).with_message(message)
            }

            QgsError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            QgsError::Internal { .. } => ExError::new(ExErrorKind::Internal).with_message(message),
        }
    }
}

/// Conversion from serde_json::Error to QgsError
impl From<serde_json::Error> for QgsError {
    fn from(err: serde_json::Error) -> Self {
        QgsError::Serialization {
            message: err.to_string(),
        }
    }
}
