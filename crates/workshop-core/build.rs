/// Builds the gRPC client and server code for `workshop.proto` using
/// `tonic-prost-build`.
///
/// Both services (`Workshop` and `SubWorkshop`) live in the same proto file so
/// the client of one service and the server of the other are generated
/// together. A file descriptor set is written next to the generated code so the
/// server can expose reflection.
///
/// # Panics
///
/// This function will `panic!` if code generation fails.
///
/// # Output
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("workshop.v1");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("workshop_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/workshop.proto"], &["proto"])
        .unwrap();
}
