fn main() {
    println!("cargo:rerun-if-env-changed=SLIDERBRIDGE_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=SLIDERBRIDGE_WIFI_PASS");
    println!("cargo:rerun-if-env-changed=SLIDERBRIDGE_SOURCE");

    // Only the device build needs the ESP-IDF environment exported.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
