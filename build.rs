//! Build script for dupescan.
//!
//! On Windows, embeds the application manifest so that scans of deeply nested
//! trees (node_modules and the like) are not cut off at the 260-character
//! MAX_PATH limit. The manifest sets `longPathAware=true`, which together with
//! the Windows 10 v1607+ registry setting allows paths up to 32,767 chars.
//!
//! On other platforms the script does nothing.

fn main() {
    #[cfg(windows)]
    {
        embed_resource::compile("dupescan.rc", embed_resource::NONE);

        println!("cargo:rerun-if-changed=dupescan.rc");
        println!("cargo:rerun-if-changed=dupescan.manifest");
    }
}
