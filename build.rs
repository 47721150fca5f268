//! Build script to track include_str! dependencies.
//! This ensures cargo rebuilds when the embedded help text changes.

fn main() {
    println!("cargo:rerun-if-changed=resources/shell_help.txt");
}
