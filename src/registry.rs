//! The fixed, ordered list of third-party dependencies.
//!
//! Order is the build order. Nothing here is computed: each entry must come
//! after everything it links against.

use crate::build::{CMake, Meson, RawMake, make_in_source};
use crate::dependency::Dependency;
use crate::fetch::{AuxiliaryFile, ReleaseArchive, SourceControl};

pub fn dependencies() -> Vec<Dependency> {
    vec![
        uuid(),
        xapian(),
        ctpp2(),
        pugixml(),
        zimlib(),
        microhttpd(),
        icu(),
        kiwix_lib(),
        kiwix_tools(),
    ]
}

/// Only libuuid is built out of e2fsprogs.
fn uuid() -> Dependency {
    Dependency::new(
        "uuid",
        "e2fsprogs-1.42",
        ReleaseArchive::new(
            "e2fsprogs-1.42.tar.gz",
            "55b46db0cec3e2eb0e5de14494a88b01ff6c0500edf8ca8927cad6da7b5e4a46",
        ),
        RawMake,
    )
    .configure_option("--enable-libuuid")
    .configure_env_template("CFLAGS", "{env.CFLAGS} -fPIC")
    .override_step("compile", |sc, log| {
        make_in_source(sc, log, &format!("-j{} libs", sc.options().jobs))
    })
    .override_step("install", |sc, log| make_in_source(sc, log, "install-libs"))
}

fn xapian() -> Dependency {
    Dependency::new(
        "xapian",
        "xapian-core-1.4.0",
        ReleaseArchive::new(
            "xapian-core-1.4.0.tar.xz",
            "10584f57112aa5e9c0e8a89e251aecbf7c582097638bfee79c1fe39a8b6a6477",
        ),
        RawMake,
    )
    .configure_option("--enable-shared --enable-static --disable-sse --disable-backend-inmemory")
    .patch("xapian_pkgconfig.patch")
    .configure_env_template("LDFLAGS", "-L{options.install_dir}/lib")
    .configure_env_template("CXXFLAGS", "-I{options.install_dir}/include")
}

fn ctpp2() -> Dependency {
    Dependency::new(
        "ctpp2",
        "ctpp2-2.8.3",
        ReleaseArchive::new(
            "ctpp2-2.8.3.tar.gz",
            "a83ffd07817adb575295ef40fbf759892512e5a63059c520f9062d9ab8fb42fc",
        ),
        CMake,
    )
    .configure_option("-DMD5_SUPPORT=OFF")
    .patch("ctpp2_include.patch")
}

/// The pugixml tarball has no top directory.
fn pugixml() -> Dependency {
    Dependency::new(
        "pugixml",
        "pugixml-1.2",
        ReleaseArchive::new(
            "pugixml-1.2.tar.gz",
            "0f422dad86da0a2e56a37fb2a88376aae6e931f22cc8b956978460c9db06136b",
        )
        .extract_into("pugixml-1.2"),
        Meson,
    )
    .patch("pugixml_meson.patch")
}

fn zimlib() -> Dependency {
    Dependency::new(
        "zimlib",
        "openzim/zimlib",
        SourceControl::new("https://gerrit.wikimedia.org/r/p/openzim.git", "openzim")
            .git_ref("meson"),
        Meson,
    )
}

fn microhttpd() -> Dependency {
    Dependency::new(
        "microhttpd",
        "libmicrohttpd-0.9.19",
        ReleaseArchive::new(
            "libmicrohttpd-0.9.19.tar.gz",
            "dc418c7a595196f09d2f573212a0d794404fa4ac5311fc9588c1e7ad7a90fae6",
        ),
        RawMake,
    )
    .configure_option(
        "--enable-shared --enable-static --disable-https --without-libgcrypt --without-libcurl",
    )
}

/// ICU ships its data as a separate file that must sit in `data/in` before configure.
fn icu() -> Dependency {
    let data = AuxiliaryFile::new(
        "icudt56l.dat",
        "e23d85eee008f335fc49e8ef37b1bc2b222db105476111e3d16f0007d371cbca",
        "data/in",
    );
    Dependency::new(
        "icu",
        "icu/source",
        ReleaseArchive::new(
            "icu4c-56_1-src.tgz",
            "3a64e9105c734dcf631c0b3ed60404531bce6c0f5a64bfe1a6402a4cc2314816",
        )
        .top_dir("icu"),
        RawMake,
    )
    .configure_script("./runConfigureICU")
    .configure_option("Linux --disable-samples --disable-tests --disable-extras --enable-static --disable-dyload")
    .after_step("patch", data.download_step())
    .after_step("patch", data.copy_step())
}

fn kiwix_lib() -> Dependency {
    Dependency::new(
        "kiwix-lib",
        "kiwix-lib",
        SourceControl::new("https://github.com/kiwix/kiwix-lib.git", "kiwix-lib")
            .git_ref("meson"),
        Meson,
    )
    .configure_option("-Dctpp2-install-prefix={options.install_dir}")
}

fn kiwix_tools() -> Dependency {
    Dependency::new(
        "kiwix-tools",
        "kiwix-tools",
        SourceControl::new("https://github.com/kiwix/kiwix-tools.git", "kiwix-tools")
            .git_ref("meson"),
        Meson,
    )
    .configure_option("-Dctpp2-install-prefix={options.install_dir}")
}
