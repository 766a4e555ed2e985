//! Cross-module tests of the object lifecycle and hierarchy traversal

mod traversal;
