fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF link arguments are only needed for the on-target build; the
    // host simulator and the test suite build without the toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
