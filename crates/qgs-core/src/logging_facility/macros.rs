//! Operator lifecycle macros
//!
//! Every tool operator logs one `start` event and exactly one of `end` or
//! `end_error`, all at the operator boundary. Field names come from
//! `qgs_core_types::schema`; callers need no direct `tracing` dependency.

/// Shared body of the lifecycle macros
#[doc(hidden)]
#[macro_export]
macro_rules! __qgs_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)+)?) => {
        $crate::__private::tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event
            $(, $($field)+)?
        );
    };
}

/// An operator is about to touch the scene
///
/// Extra fields identify what it works on.
///
/// ```
/// # use qgs_core::log_op_start;
/// log_op_start!("revert_all");
/// log_op_start!("separate", object = "Gun");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        $crate::__qgs_op_event!(
            info,
            $op,
            $crate::__private::schema::EVENT_START
            $(, $($field)+)?
        )
    };
}

/// An operator finished, possibly with warnings in its report
///
/// ```
/// # use qgs_core::log_op_end;
/// log_op_end!("create_rig", duration_ms = 3);
/// log_op_end!("create_rig", duration_ms = 3, armature = "QGS_Armature");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        $crate::__qgs_op_event!(
            info,
            $op,
            $crate::__private::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)+)?
        )
    };
}

/// An operator was cancelled or aborted
///
/// `$err` is anything convertible into `ExError` (usually a `QgsError`); its
/// kind and stable code are logged so failures can be grouped.
///
/// ```
/// # use qgs_core::{log_op_error, errors::QgsError};
/// let err = QgsError::BackupAlreadyExists { id: "QGS_backup.1".to_string() };
/// log_op_error!("separate", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__qgs_op_event!(
            error,
            $op,
            $crate::__private::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code()
            $(, $($field)+)?
        )
    }};
}
