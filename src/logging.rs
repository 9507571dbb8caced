// Macros file - tracing macros are imported within the macro definitions

/// Standardized logging macros for consistent field names and message patterns across the application
///
/// These macros ensure:
/// - Consistent field naming conventions
/// - Appropriate logging levels for different scenarios
/// - Structured logging with context

// ============================================================================
// API Operation Logging Macros
// ============================================================================

/// Log the start of an API operation with consistent fields
#[macro_export]
macro_rules! log_api_start {
    ($operation:expr, notes_length = $len:expr) => {
        tracing::debug!(
            operation = $operation,
            notes_length = $len,
            "API operation started"
        );
    };
    ($operation:expr) => {
        tracing::debug!(
            operation = $operation,
            "API operation started"
        );
    };
}

/// Log successful completion of an API operation
#[macro_export]
macro_rules! log_api_success {
    ($operation:expr, source = $source:expr, count = $count:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            source = ?$source,
            count = $count,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, source = $source:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            source = ?$source,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            "API operation completed: {}", $msg
        );
    };
}

/// Log API warnings with context
#[macro_export]
macro_rules! log_api_warn {
    ($operation:expr, $msg:expr) => {
        tracing::warn!(
            operation = $operation,
            "API operation warning: {}", $msg
        );
    };
}

// ============================================================================
// Generation Pipeline Logging Macros
// ============================================================================

/// Log generation pipeline state transitions with (task, model, outcome) context
#[macro_export]
macro_rules! log_pipeline {
    (start, run_id = $run_id:expr, task = $task:expr, models = $models:expr) => {
        tracing::info!(
            component = "pipeline",
            run_id = %$run_id,
            task = $task,
            catalog_size = $models,
            "Generation pipeline started"
        );
    };
    (attempt, run_id = $run_id:expr, task = $task:expr, model = $model:expr, index = $index:expr) => {
        tracing::debug!(
            component = "pipeline",
            run_id = %$run_id,
            task = $task,
            model = %$model,
            attempt = $index,
            "Trying model"
        );
    };
    (advance, run_id = $run_id:expr, task = $task:expr, model = $model:expr, outcome = $outcome:expr, $msg:expr) => {
        tracing::warn!(
            component = "pipeline",
            run_id = %$run_id,
            task = $task,
            model = %$model,
            outcome = $outcome,
            "Advancing to next model: {}", $msg
        );
    };
    (success, run_id = $run_id:expr, task = $task:expr, model = $model:expr, attempts = $attempts:expr) => {
        tracing::info!(
            component = "pipeline",
            run_id = %$run_id,
            task = $task,
            model = %$model,
            outcome = "success",
            attempts = $attempts,
            "Generation succeeded"
        );
    };
    (fallback, run_id = $run_id:expr, task = $task:expr, attempts = $attempts:expr) => {
        tracing::warn!(
            component = "pipeline",
            run_id = %$run_id,
            task = $task,
            outcome = "fallback",
            attempts = $attempts,
            "All models exhausted, serving local fallback"
        );
    };
    (unconfigured, run_id = $run_id:expr, task = $task:expr) => {
        tracing::warn!(
            component = "pipeline",
            run_id = %$run_id,
            task = $task,
            outcome = "unconfigured",
            "No API key configured, skipping remote generation"
        );
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

/// Log system startup and shutdown events
#[macro_export]
macro_rules! log_system_event {
    (startup, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "startup",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (shutdown, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "shutdown",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg);
    };
}

// ============================================================================
// Validation Logging Macros
// ============================================================================

/// Log validation results consistently
#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        );
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        );
    };
}
