//! Autotools-style build: `./configure`, `make`, `make install`.

use super::BuildStrategy;
use crate::core::command;
use crate::core::env::BuildEnv;
use crate::core::error::StepError;
use crate::core::step::StepLog;
use crate::dependency::{EnvOverride, StepContext};
use crate::helpers::template;

/// Join non-empty command fragments with single spaces.
pub(crate) fn command_line(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `<make> <args> <make_option>` in the dependency's source path.
pub fn make_in_source(
    sc: &StepContext<'_>,
    log: &mut StepLog,
    args: &str,
) -> Result<(), StepError> {
    let cmd = command_line(&[&sc.tools().make, args, &sc.flags().make_option]);
    command::execute(&cmd, &sc.source_path(), log, None, None)
}

/// Environment for a configure script.
///
/// Starts from the process environment, adds `-fPIC` to `CFLAGS` for static
/// builds, then applies the dependency's overrides. Templates are all
/// resolved against the environment as it stood before any override is
/// merged.
pub fn configure_env(sc: &StepContext<'_>) -> Result<BuildEnv, StepError> {
    let mut env = BuildEnv::from_process();
    if sc.options().build_static {
        env.append("CFLAGS", " -fPIC");
    }

    let mut resolved = Vec::with_capacity(sc.flags().configure_env.len());
    for entry in &sc.flags().configure_env {
        match entry {
            EnvOverride::Value { key, value } => resolved.push((key.clone(), value.clone())),
            EnvOverride::Template { key, template } => {
                let value = template::resolve(template, sc.options(), Some(&env))?;
                resolved.push((key.clone(), value));
            }
        }
    }

    for (key, value) in resolved {
        env.set(key, value);
    }
    Ok(env)
}

/// Plain `configure && make && make install`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawMake;

impl BuildStrategy for RawMake {
    fn describe(&self) -> &'static str {
        "make"
    }

    fn configure(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        let env = configure_env(sc)?;
        let option = template::resolve(&sc.flags().configure_option, sc.options(), Some(&env))?;
        let install_dir = sc.options().install_dir.display().to_string();
        let cmd = command_line(&[
            &sc.flags().configure_script,
            &option,
            "--prefix",
            &install_dir,
        ]);
        command::execute(&cmd, &sc.source_path(), log, Some(env), None)
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

    fn context(dir: &TempDir, build_static: bool) -> BuildContext {
        let layout = Layout::rooted_at(dir.path());
        layout.ensure_dirs().unwrap();
        let options = BuildOptions::new(dir.path().join("install")).build_static(build_static);
        BuildContext::new(options, layout)
    }

    fn dep() -> Dependency {
        Dependency::new(
            "demo",
            "demo-1.0",
            ReleaseArchive::new("demo-1.0.tar.gz", "00"),
            RawMake,
        )
    }

    /// A configure script that dumps the variables we care about.
    fn write_configure(source: &std::path::Path) {
        std::fs::create_dir_all(source).unwrap();
        let script = source.join("configure");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             echo \"args=$*\" > configured\n\
             echo \"CFLAGS=$CFLAGS\" >> configured\n\
             echo \"LDFLAGS=$LDFLAGS\" >> configured\n",
        )
        .unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn test_command_line_drops_empty_parts() {
        assert_eq!(command_line(&["make", "-j4", ""]), "make -j4");
        assert_eq!(
            command_line(&["./configure", "", "--prefix", "/opt"]),
            "./configure --prefix /opt"
        );
    }

    #[test]
    fn test_static_build_injects_fpic() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, true);
        let dep = dep();
        let sc = StepContext { dep: &dep, ctx: &ctx };

        let env = configure_env(&sc).unwrap();
        let inherited = std::env::var("CFLAGS").unwrap_or_default();
        assert_eq!(env.get("CFLAGS"), format!("{} -fPIC", inherited));
    }

    #[test]
    fn test_shared_build_leaves_cflags() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, false);
        let dep = dep();
        let sc = StepContext { dep: &dep, ctx: &ctx };

        let env = configure_env(&sc).unwrap();
        assert_eq!(env.get("CFLAGS"), std::env::var("CFLAGS").unwrap_or_default());
    }

    #[test]
    fn test_templates_resolved_before_merge() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, true);
        let dep = dep()
            .configure_env("LDFLAGS", "-L/literal")
            .configure_env_template("CFLAGS", "{env.CFLAGS} -I{options.install_dir}/include");
        let sc = StepContext { dep: &dep, ctx: &ctx };

        let env = configure_env(&sc).unwrap();
        let inherited = std::env::var("CFLAGS").unwrap_or_default();
        assert_eq!(
            env.get("CFLAGS"),
            format!(
                "{} -fPIC -I{}/include",
                inherited,
                ctx.options.install_dir.display()
            )
        );
        assert_eq!(env.get("LDFLAGS"), "-L/literal");
    }

    #[test]
    fn test_configure_runs_script_with_prefix() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, false);
        let dep = dep()
            .configure_option("--enable-libuuid")
            .configure_env("LDFLAGS", "-L/x");
        write_configure(&dep.source_path(&ctx.layout));

        configure_only(&dep, &ctx);

        let out =
            std::fs::read_to_string(dep.source_path(&ctx.layout).join("configured")).unwrap();
        assert!(out.contains(&format!(
            "args=--enable-libuuid --prefix {}",
            ctx.options.install_dir.display()
        )));
        assert!(out.contains("LDFLAGS=-L/x"));
    }

    #[test]
    fn test_full_build_marks_every_step() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, false).tools(Toolchain {
            make: "echo make".to_string(),
            ..Toolchain::default()
        });
        let dep = dep().make_option("V=1");
        let source = dep.source_path(&ctx.layout);
        write_configure(&source);

        dep.build(&ctx).unwrap();

        for step in ["configure", "compile", "install"] {
            assert!(marker_path(&source, step).exists(), "{step} not marked");
        }
        let compile = std::fs::read_to_string(source.join("cmd_compile_demo.log")).unwrap();
        assert!(compile.contains("make -j4 V=1"));
        let install = std::fs::read_to_string(source.join("cmd_install_demo.log")).unwrap();
        assert!(install.contains("make install V=1"));
    }

    #[test]
    fn test_marked_steps_are_not_rerun() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, false).tools(Toolchain {
            make: "false".to_string(),
            ..Toolchain::default()
        });
        let dep = dep();
        let source = dep.source_path(&ctx.layout);
        std::fs::create_dir_all(&source).unwrap();
        for step in ["configure", "compile", "install"] {
            std::fs::write(marker_path(&source, step), "").unwrap();
        }

        // `false` as make would fail if anything ran.
        dep.build(&ctx).unwrap();
    }

    fn configure_only(dep: &Dependency, ctx: &BuildContext) {
        let sc = StepContext { dep, ctx };
        let mut log = StepLog::create(ctx.layout.source_dir.join("configure.log")).unwrap();
        RawMake.configure(&sc, &mut log).unwrap();
    }
}
