//! Meson configure in a fresh `build/` directory, ninja for compile and install.

use std::path::PathBuf;

use super::BuildStrategy;
use super::make::command_line;
use crate::core::command;
use crate::core::env::BuildEnv;
use crate::core::error::StepError;
use crate::core::step::StepLog;
use crate::dependency::StepContext;
use crate::helpers::template;

#[derive(Debug, Clone, Copy, Default)]
pub struct Meson;

impl Meson {
    pub fn build_path(sc: &StepContext<'_>) -> PathBuf {
        sc.source_path().join("build")
    }

    fn configure_env(sc: &StepContext<'_>) -> BuildEnv {
        let install_dir = &sc.options().install_dir;
        let mut env = BuildEnv::from_process();
        env.set(
            "PKG_CONFIG_PATH",
            format!(
                "{}:{}",
                install_dir.join("lib64").join("pkgconfig").display(),
                install_dir.join("lib").join("pkgconfig").display()
            ),
        );
        if sc.options().build_static {
            env.append("LDFLAGS", " -static-libstdc++ --static");
        }
        env
    }
}

impl BuildStrategy for Meson {
    fn describe(&self) -> &'static str {
        "meson"
    }

    fn configure(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        let build_path = Self::build_path(sc);
        if build_path.exists() {
            std::fs::remove_dir_all(&build_path)?;
        }
        std::fs::create_dir_all(&build_path)?;

        let options = sc.options();
        let library_type = if options.build_static { "static" } else { "shared" };
        let option = template::resolve(&sc.flags().configure_option, options, None)?;
        let default_library = format!("--default-library={}", library_type);
        let prefix = format!("--prefix={}", options.install_dir.display());
        let cmd = command_line(&[
            &sc.tools().meson,
            &default_library,
            &option,
            ". build",
            &prefix,
        ]);

        let env = Self::configure_env(sc);
        command::execute(&cmd, &sc.source_path(), log, Some(env), None)
    }

    fn compile(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        let cmd = format!("{} -v", sc.tools().ninja);
        command::execute(&cmd, &Self::build_path(sc), log, None, None)
    }

    fn install(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        let cmd = format!("{} -v install", sc.tools().ninja);
        command::execute(&cmd, &Self::build_path(sc), log, None, None)
    }

    /// Ninja tracks its own state; compile and install always run.
    fn marks_compile(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{BuildContext, BuildOptions, Layout, Toolchain};
    use crate::core::step::marker_path;
    use crate::dependency::Dependency;
    use crate::fetch::SourceControl;
    use tempfile::TempDir;

    fn kiwix_lib() -> Dependency {
        Dependency::new(
            "kiwix-lib",
            "kiwix-lib",
            SourceControl::new("https://example.com/kiwix-lib.git", "kiwix-lib"),
            Meson,
        )
        .configure_option("-Dctpp2-install-prefix={options.install_dir}")
    }

    fn context(dir: &TempDir, build_static: bool) -> BuildContext {
        let layout = Layout::rooted_at(dir.path());
        layout.ensure_dirs().unwrap();
        let options = BuildOptions::new("/opt/kiwix").build_static(build_static);
        BuildContext::new(options, layout).tools(Toolchain {
            meson: "echo meson".to_string(),
            ninja: "echo ninja".to_string(),
            ..Toolchain::default()
        })
    }

    #[test]
    fn test_configure_command_and_env() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, true);
        let dep = kiwix_lib();
        std::fs::create_dir_all(dep.source_path(&ctx.layout)).unwrap();
        let sc = StepContext { dep: &dep, ctx: &ctx };

        let mut log = StepLog::create(dir.path().join("configure.log")).unwrap();
        Meson.configure(&sc, &mut log).unwrap();
        let out = log.contents().unwrap();

        assert!(out.contains(
            "meson --default-library=static -Dctpp2-install-prefix=/opt/kiwix . build \
             --prefix=/opt/kiwix"
        ));
        assert!(out.contains(
            "PKG_CONFIG_PATH : \"/opt/kiwix/lib64/pkgconfig:/opt/kiwix/lib/pkgconfig\""
        ));
        assert!(out.contains("-static-libstdc++ --static"));
    }

    #[test]
    fn test_shared_library_by_default() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, false);
        let dep = kiwix_lib();
        std::fs::create_dir_all(dep.source_path(&ctx.layout)).unwrap();
        let sc = StepContext { dep: &dep, ctx: &ctx };

        let mut log = StepLog::create(dir.path().join("configure.log")).unwrap();
        Meson.configure(&sc, &mut log).unwrap();
        assert!(log.contents().unwrap().contains("--default-library=shared"));
    }

    #[test]
    fn test_configure_recreates_build_dir() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, false);
        let dep = kiwix_lib();
        let sc = StepContext { dep: &dep, ctx: &ctx };
        let build = Meson::build_path(&sc);
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(build.join("stale.ninja"), "old").unwrap();

        let mut log = StepLog::create(dir.path().join("configure.log")).unwrap();
        Meson.configure(&sc, &mut log).unwrap();

        assert!(build.is_dir());
        assert!(!build.join("stale.ninja").exists());
    }

    #[test]
    fn test_compile_and_install_run_in_build_dir_every_time() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, false);
        let dep = kiwix_lib();
        let source = dep.source_path(&ctx.layout);
        std::fs::create_dir_all(&source).unwrap();

        dep.build(&ctx).unwrap();
        assert!(marker_path(&source, "configure").exists());
        assert!(!marker_path(&source, "compile").exists());
        assert!(!marker_path(&source, "install").exists());

        let compile = std::fs::read_to_string(source.join("cmd_compile_kiwix-lib.log")).unwrap();
        assert!(compile.contains("run command 'echo ninja -v'"));

        // Second run: configure is skipped, ninja runs again.
        std::fs::remove_file(source.join("cmd_install_kiwix-lib.log")).unwrap();
        dep.build(&ctx).unwrap();
        let install = std::fs::read_to_string(source.join("cmd_install_kiwix-lib.log")).unwrap();
        assert!(install.contains("ninja -v install"));
    }
}
