use super::BuildStrategy;
use super::make::command_line;
use crate::core::command;
use crate::core::error::StepError;
use crate::core::step::StepLog;
use crate::dependency::StepContext;
use crate::helpers::template;

/// CMake configure, make-driven compile and install.
#[derive(Debug, Clone, Copy, Default)]
pub struct CMake;

impl BuildStrategy for CMake {
    fn describe(&self) -> &'static str {
        "cmake"
    }

    fn configure(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        let options = sc.options();
        let option = template::resolve(&sc.flags().configure_option, options, None)?;
        let prefix = format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            options.install_dir.display()
        );
        let libdir = format!("-DCMAKE_INSTALL_LIBDIR={}", options.libdir());
        let cmd = command_line(&[&sc.tools().cmake, &option, &prefix, &libdir]);
        command::execute(&cmd, &sc.source_path(), log, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{BuildContext, BuildOptions, Layout, Toolchain};
    use crate::core::step::marker_path;
    use crate::dependency::Dependency;
    use crate::fetch::ReleaseArchive;
    use tempfile::TempDir;

    fn ctpp2() -> Dependency {
        Dependency::new(
            "ctpp2",
            "ctpp2-2.8.3",
            ReleaseArchive::new("ctpp2-2.8.3.tar.gz", "00"),
            CMake,
        )
        .configure_option("-DMD5_SUPPORT=OFF")
    }

    fn context(dir: &TempDir, arch: &str) -> BuildContext {
        let layout = Layout::rooted_at(dir.path());
        layout.ensure_dirs().unwrap();
        let options = BuildOptions::new("/opt/kiwix").target_arch(arch);
        BuildContext::new(options, layout).tools(Toolchain {
            cmake: "echo cmake".to_string(),
            make: "echo make".to_string(),
            ..Toolchain::default()
        })
    }

    fn configure_log(dir: &TempDir, arch: &str) -> String {
        let ctx = context(dir, arch);
        let dep = ctpp2();
        std::fs::create_dir_all(dep.source_path(&ctx.layout)).unwrap();
        let sc = StepContext { dep: &dep, ctx: &ctx };
        let mut log = StepLog::create(dir.path().join("configure.log")).unwrap();
        CMake.configure(&sc, &mut log).unwrap();
        log.contents().unwrap()
    }

    #[test]
    fn test_configure_uses_lib64_on_64bit() {
        let dir = TempDir::new().unwrap();
        let out = configure_log(&dir, "x86_64");
        assert!(out.contains(
            "cmake -DMD5_SUPPORT=OFF -DCMAKE_INSTALL_PREFIX=/opt/kiwix \
             -DCMAKE_INSTALL_LIBDIR=lib64"
        ));
    }

    #[test]
    fn test_configure_uses_lib_on_32bit() {
        let dir = TempDir::new().unwrap();
        let out = configure_log(&dir, "i686");
        assert!(out.contains("-DCMAKE_INSTALL_LIBDIR=lib\n"));
        assert!(!out.contains("lib64"));
    }

    #[test]
    fn test_compile_and_install_go_through_make() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, "x86_64");
        let dep = ctpp2();
        let source = dep.source_path(&ctx.layout);
        std::fs::create_dir_all(&source).unwrap();

        dep.build(&ctx).unwrap();

        let compile = std::fs::read_to_string(source.join("cmd_compile_ctpp2.log")).unwrap();
        assert!(compile.contains("make -j4"));
        let install = std::fs::read_to_string(source.join("cmd_install_ctpp2.log")).unwrap();
        assert!(install.contains("make install"));
        assert!(marker_path(&source, "install").exists());
    }
}
