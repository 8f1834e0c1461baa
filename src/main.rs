#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), torus_core::RenderError> {
    torus_core::run()
}

// The web build starts through the library's `#[wasm_bindgen(start)]` entry point.
#[cfg(target_arch = "wasm32")]
fn main() {}
