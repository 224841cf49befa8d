//! Template-specific checks and the per-template check tables.

use mlf_core_renderer::TemplateKind;

use crate::checks::{self, LintContext};
use crate::error::LintError;
use crate::files::{check_required_files, missing_lines, FileRules};
use crate::report::LintReport;

pub type CheckFn = fn(&LintContext, &mut LintReport) -> Result<(), LintError>;

/// A named check, run in table order.
#[derive(Clone, Copy)]
pub struct CheckDescriptor {
    pub name: &'static str,
    pub run: CheckFn,
}

const fn check(name: &'static str, run: CheckFn) -> CheckDescriptor {
    CheckDescriptor { name, run }
}

/// Run by every project.
pub const GENERAL_CHECKS: &[CheckDescriptor] = &[
    check("check_files_exist", checks::files_exist),
    check("check_docker", checks::docker),
    check("check_mlf_core_todos", checks::todos),
    check("check_no_cookiecutter_strings", checks::no_cookiecutter_strings),
    check("check_version_consistent", checks::version_consistent),
    check("lint_changelog", checks::changelog),
];

const MLFLOW_PYTORCH_CHECKS: &[CheckDescriptor] = &[
    check("mlflow_mlf_core_py_complete", mlf_core_py_complete),
    check("pytorch_files_exist", mlflow_files_exist),
    check("pytorch_reproducibility_seeds", pytorch_reproducibility_seeds),
];

const MLFLOW_TENSORFLOW_CHECKS: &[CheckDescriptor] = &[
    check("mlflow_mlf_core_py_complete", mlf_core_py_complete),
    check("tensorflow_files_exist", mlflow_files_exist),
    check("tensorflow_reproducibility_seeds", tensorflow_reproducibility_seeds),
];

const MLFLOW_XGBOOST_CHECKS: &[CheckDescriptor] = &[
    check("mlflow_mlf_core_py_complete", mlf_core_py_complete),
    check("xgboost_files_exist", mlflow_files_exist),
];

const PACKAGE_PREDICTION_CHECKS: &[CheckDescriptor] = &[
    check("prediction_files_exist", package_files_exist),
];

/// The template-specific table for `kind`.
pub fn checks_for(kind: TemplateKind) -> &'static [CheckDescriptor] {
    match kind {
        TemplateKind::MlflowPytorch     => MLFLOW_PYTORCH_CHECKS,
        TemplateKind::MlflowTensorflow  => MLFLOW_TENSORFLOW_CHECKS,
        TemplateKind::MlflowXgboost     => MLFLOW_XGBOOST_CHECKS,
        TemplateKind::MlflowXgboostDask => MLFLOW_XGBOOST_CHECKS,
        TemplateKind::PackagePrediction => PACKAGE_PREDICTION_CHECKS,
    }
}

// ---------------------------------------------------------------------------
// mlflow
// ---------------------------------------------------------------------------

const MLF_CORE_PY: &str = "mlf_core/mlf_core.py";

fn mlf_core_py_complete(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    const CODE: &str = "mlflow-general-8";
    let path = ctx.package_path(MLF_CORE_PY);
    if !path.is_file() {
        report.fail(CODE, "mlf_core.py could not be found!");
        return Ok(());
    }
    let slug = &ctx.metadata.project_slug_no_hyphen;
    let expected: Vec<String> = [
        "def set_general_random_seeds(seed):",
        "os.environ['PYTHONHASHSEED'] = str(seed)  # Python general",
        "np.random.seed(seed)  # Numpy random",
        "random.seed(seed)  # Python random",
        "def log_sys_intel_conda_env():",
        "reports_output_dir = tempfile.mkdtemp()",
        "MLFCore.log_system_intelligence(reports_output_dir)",
        "MLFCore.log_conda_environment(reports_output_dir)",
        "mlflow.log_artifacts(reports_output_dir, artifact_path='reports')",
    ]
    .into_iter()
    .map(String::from)
    .chain([
        format!(
            "subprocess.call(['conda', 'env', 'export', '--name', '{slug}'], stdout=conda_env_filehandler)"
        ),
        format!(
            "mlflow.log_artifact(f'{{reports_output_dir}}/{slug}_conda_environment.yml', artifact_path='reports')"
        ),
    ])
    .collect();

    let missing = missing_lines(&path, &expected)?;
    for line in &missing {
        report.fail(CODE, format!("{line} not found in mlf_core.py"));
    }
    if missing.is_empty() {
        report.pass(CODE, "mlf_core.py is complete");
    }
    Ok(())
}

fn mlflow_files_exist(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    let mlf_core_py = format!("{}/{MLF_CORE_PY}", ctx.metadata.project_slug_no_hyphen);
    let required: [&[&str]; 3] = [&["MLproject"], &["environment.yml"], &[mlf_core_py.as_str()]];
    let rules = FileRules {
        required: &required,
        recommended: &[
            &[".github/workflows/train_cpu.yml"],
            &[".github/workflows/run_flake8_linting.yml"],
            &[".github/workflows/run_bandit.yml"],
        ],
        forbidden: &["__pycache__"],
        ..FileRules::default()
    };
    let code = format!("{}-1", ctx.kind.handle());
    report.merge(check_required_files(&ctx.root, &code, &rules));
    Ok(())
}

/// Check `(file, lines)` pairs and report each missing line under `code`.
fn expect_lines(
    ctx: &LintContext,
    report: &mut LintReport,
    code: &str,
    expectations: &[(String, Vec<String>)],
) -> Result<(), LintError> {
    let mut all_present = true;
    for (rel, lines) in expectations {
        let path = ctx.package_path(rel);
        if !path.is_file() {
            all_present = false;
            report.fail(code, format!("{} could not be found!", path.display()));
            continue;
        }
        for line in missing_lines(&path, lines)? {
            all_present = false;
            report.fail(code, format!("{line} not found in {}", path.display()));
        }
    }
    if all_present {
        report.pass(code, "All required reproducibility settings enabled.");
    }
    Ok(())
}

fn entry_point(ctx: &LintContext) -> String {
    format!("{}.py", ctx.metadata.project_slug_no_hyphen)
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pytorch_reproducibility_seeds(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    let expectations = [
        (
            MLF_CORE_PY.to_string(),
            lines(&[
                "def set_pytorch_random_seeds(seed, num_gpus):",
                "torch.manual_seed(seed)",
                "torch.cuda.manual_seed(seed)",
                "torch.cuda.manual_seed_all(seed)  # For multiGPU",
                "torch.backends.cudnn.deterministic = True",
                "torch.backends.cudnn.benchmark = False",
            ]),
        ),
        (
            entry_point(ctx),
            lines(&[
                "MLFCore.set_general_random_seeds(general_seed)",
                "MLFCore.set_pytorch_random_seeds(pytorch_seed, num_gpus)",
                "MLFCore.log_sys_intel_conda_env()",
            ]),
        ),
    ];
    expect_lines(ctx, report, "mlflow-pytorch-2", &expectations)
}

fn tensorflow_reproducibility_seeds(
    ctx: &LintContext,
    report: &mut LintReport,
) -> Result<(), LintError> {
    let expectations = [
        (
            MLF_CORE_PY.to_string(),
            lines(&[
                "def set_tensorflow_random_seeds(seed):",
                "tf.random.set_seed(seed)",
                "os.environ['TF_DETERMINISTIC_OPS'] = '1'",
            ]),
        ),
        (
            entry_point(ctx),
            lines(&[
                "MLFCore.set_general_random_seeds(general_seed)",
                "MLFCore.set_tensorflow_random_seeds(tensorflow_seed)",
                "MLFCore.log_sys_intel_conda_env()",
            ]),
        ),
    ];
    expect_lines(ctx, report, "mlflow-tensorflow-2", &expectations)
}

// ---------------------------------------------------------------------------
// package
// ---------------------------------------------------------------------------

fn package_files_exist(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    let rules = FileRules {
        required: &[&["setup.py"], &["setup.cfg"], &["MANIFEST.in"]],
        recommended: &[&["requirements.txt"]],
        discouraged: &["__pycache__"],
        ..FileRules::default()
    };
    let code = format!("{}-1", ctx.kind.handle());
    report.merge(check_required_files(&ctx.root, &code, &rules));
    Ok(())
}
