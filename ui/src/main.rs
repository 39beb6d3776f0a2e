#[cfg(all(feature = "csr", target_arch = "wasm32"))]
fn main() {
    ui::start();
}

#[cfg(not(all(feature = "csr", target_arch = "wasm32")))]
fn main() {}
