// build.rs

fn main() {
    // Generate build info (falls back to placeholder values outside a git checkout)
    vergen::EmitBuilder::builder()
        .all_build()
        .git_sha(true)
        .emit()
        .expect("Unable to generate build info");
}
