//! Unit tests for annotation files.
//!
//! These tests verify document parsing, entry validation, and round trips
//! through JSON and through files on disk.
