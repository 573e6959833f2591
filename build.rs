fn main() {
    println!("cargo:rerun-if-env-changed=SAFELABS_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=SAFELABS_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=SAFELABS_RTDB_URL");
    println!("cargo:rerun-if-env-changed=SAFELABS_RTDB_SECRET");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
