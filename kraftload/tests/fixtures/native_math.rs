//! Minimal native module compiled by `tests/native_module.rs`.
//!
//! Exports `add` and `multiply` but not `subtract`. Building with
//! `--cfg next_abi` advertises an ABI version the host does not speak.

#[repr(C)]
pub struct KraftModuleV1 {
    pub abi_version: u32,
    pub add: Option<extern "C" fn(f64, f64) -> f64>,
    pub subtract: Option<extern "C" fn(f64, f64) -> f64>,
    pub multiply: Option<extern "C" fn(f64, f64) -> f64>,
}

#[cfg(not(next_abi))]
const ABI_VERSION: u32 = 1;
#[cfg(next_abi)]
const ABI_VERSION: u32 = 2;

extern "C" fn add(a: f64, b: f64) -> f64 {
    a + b
}

extern "C" fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

static TABLE: KraftModuleV1 = KraftModuleV1 {
    abi_version: ABI_VERSION,
    add: Some(add),
    subtract: None,
    multiply: Some(multiply),
};

#[no_mangle]
pub extern "C" fn kraft_module_entry() -> *const KraftModuleV1 {
    &TABLE
}
