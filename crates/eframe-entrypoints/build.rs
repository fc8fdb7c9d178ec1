fn main() {
    // Generates the `shadow.rs` consumed by `shadow!(build)` in metadata.rs
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("failed to generate build metadata");
}
