//! Integration tests for the Engine logging system
//!
//! These tests verify the logger plumbing and the events the partitioners
//! report through it (configuration errors, structural changes, clears).
//!
//! Run with: cargo test --test logging_integration_tests

use galaxy_3d_spatial::galaxy3d::Engine;
use galaxy_3d_spatial::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use galaxy_3d_spatial::galaxy3d::spatial::{
    EntityHandle, GridConfig, GridPartitioner, OctreeConfig, OctreePartitioner,
    QuadtreeConfig, QuadtreePartitioner, SpatialPartitioner,
};
use galaxy_3d_spatial::glam::Vec3;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.push(LogEntry {
            severity: entry.severity,
            timestamp: entry.timestamp,
            source: entry.source.clone(),
            message: entry.message.clone(),
            file: entry.file,
            line: entry.line,
        });
    }
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    // Create test logger
    let (test_logger, entries) = TestLogger::new();

    // Set custom logger
    Engine::set_logger(test_logger);

    // Log some messages
    Engine::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Engine::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());
    Engine::log(LogSeverity::Error, "test::module", "Test error message".to_string());

    // Verify logs were captured
    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 3);

    // Verify first log (Info)
    assert_eq!(captured_entries[0].severity, LogSeverity::Info);
    assert_eq!(captured_entries[0].source, "test::module");
    assert_eq!(captured_entries[0].message, "Test info message");

    // Verify second log (Warn)
    assert_eq!(captured_entries[1].severity, LogSeverity::Warn);
    assert_eq!(captured_entries[1].source, "test::module");
    assert_eq!(captured_entries[1].message, "Test warning message");

    // Verify third log (Error)
    assert_eq!(captured_entries[2].severity, LogSeverity::Error);
    assert_eq!(captured_entries[2].source, "test::module");
    assert_eq!(captured_entries[2].message, "Test error message");

    // Reset to default logger
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    // Create test logger
    let (test_logger, entries) = TestLogger::new();

    // Set custom logger
    Engine::set_logger(test_logger);

    // Log error with file and line information
    Engine::log_detailed(
        LogSeverity::Error,
        "test::error",
        "Critical error occurred".to_string(),
        "test_file.rs",
        42,
    );

    // Verify log was captured with location
    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 1);

    let entry = &captured_entries[0];
    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.source, "test::error");
    assert_eq!(entry.message, "Critical error occurred");
    assert_eq!(entry.file, Some("test_file.rs"));
    assert_eq!(entry.line, Some(42));

    // Reset to default logger
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    // Create test logger
    let (test_logger, entries) = TestLogger::new();

    // Set custom logger
    Engine::set_logger(test_logger);

    // Log a message
    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());

    // Verify log was captured
    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
    }

    // Reset to default logger
    Engine::reset_logger();

    // Log another message (will go to default logger, not captured)
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    // Verify no new logs in test logger
    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1); // Still only one message
}

#[test]
#[serial]
fn test_integration_logging_different_severities() {
    // Create test logger
    let (test_logger, entries) = TestLogger::new();

    // Set custom logger
    Engine::set_logger(test_logger);

    // Log messages with all severity levels
    Engine::log(LogSeverity::Trace, "test", "Trace message".to_string());
    Engine::log(LogSeverity::Debug, "test", "Debug message".to_string());
    Engine::log(LogSeverity::Info, "test", "Info message".to_string());
    Engine::log(LogSeverity::Warn, "test", "Warn message".to_string());
    Engine::log(LogSeverity::Error, "test", "Error message".to_string());

    // Verify all severities were captured
    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 5);

    assert_eq!(captured_entries[0].severity, LogSeverity::Trace);
    assert_eq!(captured_entries[1].severity, LogSeverity::Debug);
    assert_eq!(captured_entries[2].severity, LogSeverity::Info);
    assert_eq!(captured_entries[3].severity, LogSeverity::Warn);
    assert_eq!(captured_entries[4].severity, LogSeverity::Error);

    // Reset to default logger
    Engine::reset_logger();
}

// ============================================================================
// PARTITIONER EVENTS
// ============================================================================

fn entries_from(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<(LogSeverity, String)> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == source)
        .map(|e| (e.severity, e.message.clone()))
        .collect()
}

#[test]
#[serial]
fn test_integration_invalid_config_is_logged_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let result = GridPartitioner::new(GridConfig::default().with_cell_size(-1.0));
    assert!(result.is_err());

    {
        let captured = entries.lock().unwrap();
        let entry = captured
            .iter()
            .find(|e| e.source == "galaxy3d::Grid")
            .expect("grid error should be logged");
        assert_eq!(entry.severity, LogSeverity::Error);
        assert!(entry.message.contains("Invalid cell size"));
        assert!(entry.file.is_some());
        assert!(entry.line.is_some());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_structural_events_at_trace_level() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);
    Engine::set_log_level(LogSeverity::Trace);

    let mut octree = OctreePartitioner::new(
        OctreeConfig::default().with_max_entities_per_node(1),
    )
    .unwrap();
    octree.update(EntityHandle::new(1, 0), Vec3::splat(10.0), None);
    octree.update(EntityHandle::new(2, 0), Vec3::splat(-10.0), None);
    octree.remove(EntityHandle::new(1, 0));
    octree.remove(EntityHandle::new(2, 0));
    octree.clear();

    Engine::set_log_level(LogSeverity::Info);

    let events = entries_from(&entries, "galaxy3d::Octree");
    assert!(events.iter().any(|(s, m)| *s == LogSeverity::Debug && m.starts_with("Created tree")));
    assert!(events.iter().any(|(s, m)| *s == LogSeverity::Trace && m.starts_with("Subdivided node 0")));
    assert!(events.iter().any(|(s, m)| *s == LogSeverity::Trace && m.starts_with("Merged node 0")));
    assert!(events.iter().any(|(s, m)| *s == LogSeverity::Debug && m.starts_with("Cleared tree")));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_default_level_hides_structural_events() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);
    Engine::set_log_level(LogSeverity::Info);

    let mut quadtree = QuadtreePartitioner::new(
        QuadtreeConfig::default().with_max_entities_per_node(1),
    )
    .unwrap();
    quadtree.update(EntityHandle::new(1, 0), Vec3::splat(10.0), None);
    quadtree.update(EntityHandle::new(2, 0), Vec3::splat(-10.0), None);
    quadtree.clear();

    assert!(entries_from(&entries, "galaxy3d::Quadtree").is_empty());

    Engine::reset_logger();
}
