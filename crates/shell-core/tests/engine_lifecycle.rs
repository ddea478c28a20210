use std::cell::RefCell;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use shell_core::{Artifact, CommandOutput, ErrorClass, ExecutionRequest, JobEventKind, JobOptions, JobQueue, JobSpec,
                 JobState, OutputParser, ProcessOutcome, ProcessRunner, ShellEngine, ShellJobError, Transport};
use uuid::Uuid;

/// Runner falso: escribe archivos predefinidos en el directorio de trabajo
/// y recuerda las peticiones recibidas.
#[derive(Default)]
struct ScriptedRunner {
    stdout: String,
    stderr: String,
    status: i32,
    extra: Vec<(String, String)>,
    seen: RefCell<Vec<ExecutionRequest>>,
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, request: &ExecutionRequest) -> Result<ProcessOutcome, ShellJobError> {
        let dir = &request.working_dir;
        fs::write(dir.join(&request.stdout_name), &self.stdout)?;
        if let Some(stderr) = &request.stderr_name {
            fs::write(dir.join(stderr), &self.stderr)?;
        }
        fs::write(dir.join(&request.status_name), self.status.to_string())?;
        for (name, content) in &self.extra {
            fs::write(dir.join(name), content)?;
        }
        self.seen.borrow_mut().push(request.clone());
        Ok(ProcessOutcome { exit_status: Some(self.status) })
    }
}

/// Transporte falso: "copia" escribiendo un archivo con el nombre del
/// origen y registra las llamadas.
#[derive(Default)]
struct RecordingTransport {
    calls: RefCell<Vec<String>>,
}

impl Transport for RecordingTransport {
    fn copy_tree(&self, computer: &str, remote_path: &str, dest: &Path) -> Result<(), ShellJobError> {
        self.calls.borrow_mut().push(format!("copy {computer}:{remote_path}"));
        fs::write(dest.join("from_remote.txt"), remote_path)?;
        Ok(())
    }

    fn symlink_tree(&self, computer: &str, remote_path: &str, _dest: &Path) -> Result<(), ShellJobError> {
        self.calls.borrow_mut().push(format!("symlink {computer}:{remote_path}"));
        Ok(())
    }

    fn exec_command_wait(&self, _computer: &str, _command: &[String]) -> Result<CommandOutput, ShellJobError> {
        Err(ShellJobError::Transport("not supported".into()))
    }
}

#[derive(Default)]
struct VecQueue(Vec<(Uuid, JobSpec)>);

impl JobQueue for VecQueue {
    fn enqueue(&mut self, job_id: Uuid, spec: JobSpec) -> Result<(), ShellJobError> {
        self.0.push((job_id, spec));
        Ok(())
    }
}

fn engine(runner: ScriptedRunner) -> (tempfile::TempDir, ShellEngine<shell_core::InMemoryEventStore, ScriptedRunner, RecordingTransport>) {
    let root = tempfile::tempdir().expect("tmp");
    let engine = ShellEngine::new(runner, RecordingTransport::default()).workdir_root(root.path())
                                                                        .build();
    (root, engine)
}

#[test]
fn full_lifecycle_emits_events_in_order() {
    let runner = ScriptedRunner { stdout: "hello\n".into(),
                                  ..Default::default() };
    let (_root, mut engine) = engine(runner);
    let spec = JobSpec::new("/bin/echo").arguments(vec!["{greeting}"])
                                        .node("greeting", Artifact::scalar("hello"));
    let (artifacts, record) = engine.run(spec).expect("el job debería completarse");

    assert_eq!(artifacts["stdout"].text().as_deref(), Some("hello\n"));
    assert!(record.is_finished_ok());
    assert_eq!(record.arguments, vec!["hello"]);
    assert_eq!(record.process_label.as_deref(), Some("ShellJob<echo@localhost>"));

    let kinds: Vec<&'static str> = engine.events_for(record.job_id)
                                         .iter()
                                         .map(|e| match e.kind {
                                             JobEventKind::JobCreated { .. } => "created",
                                             JobEventKind::JobStaged { .. } => "staged",
                                             JobEventKind::JobExecuted { .. } => "executed",
                                             JobEventKind::JobParsed { .. } => "parsed",
                                             JobEventKind::JobFinalized { .. } => "finalized",
                                             JobEventKind::JobFailed { .. } => "failed",
                                         })
                                         .collect();
    assert_eq!(kinds, vec!["created", "staged", "executed", "parsed", "finalized"]);
}

#[test]
fn validation_errors_emit_no_events() {
    let (root, mut engine) = engine(ScriptedRunner::default());
    let spec = JobSpec::new("cat").arguments(vec!["{missing}"]);
    let err = engine.run(spec).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
    assert!(engine.event_store().job_ids().is_empty());
    assert_eq!(fs::read_dir(root.path()).map(|d| d.count()).unwrap_or(0), 0);
}

#[test]
fn redirect_in_arguments_rejected_before_running() {
    let (_root, mut engine) = engine(ScriptedRunner::default());
    let err = engine.run(JobSpec::new("cat").arguments("a > b")).unwrap_err();
    assert!(matches!(err, ShellJobError::StdoutRedirect));
}

#[test]
fn suspicious_and_failed_outcomes_are_not_errors() {
    let runner = ScriptedRunner { stderr: "warning\n".into(),
                                  ..Default::default() };
    let (_root, mut suspicious) = engine(runner);
    let (_, record) = suspicious.run(JobSpec::new("tool")).expect("sin error del adaptador");
    assert_eq!(record.exit_code.as_ref().map(|c| c.status), Some(410));

    let runner = ScriptedRunner { stderr: "boom".into(),
                                  status: 3,
                                  ..Default::default() };
    let (_root, mut failed) = engine(runner);
    let (_, record) = failed.run(JobSpec::new("tool")).expect("sin error del adaptador");
    assert_eq!(record.exit_code.as_ref().map(|c| c.status), Some(400));
    assert_eq!(record.exit_status, Some(3));
}

#[test]
fn stdin_redirect_and_mpi_prefix_reach_runner() {
    let (_root, mut engine) = engine(ScriptedRunner::default());
    let mut options = JobOptions { filename_stdin: Some("data".into()),
                                   ..Default::default() };
    options.mpi.withmpi = true;
    options.mpi.tot_num_mpiprocs = 2;
    let spec = JobSpec::new("cat").arguments(vec!["{data}"])
                                  .node("data", Artifact::single_file("x\n"))
                                  .options(options);
    engine.run(spec).expect("job");
    let seen = engine_runner_requests(&engine);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].stdin.as_deref(), Some("data"));
    assert!(seen[0].arguments.is_empty());
    assert_eq!(seen[0].command_line(), vec!["mpirun", "-np", "2", "cat"]);
}

fn engine_runner_requests(engine: &ShellEngine<shell_core::InMemoryEventStore, ScriptedRunner, RecordingTransport>) -> Vec<ExecutionRequest> {
    engine.runner().seen.borrow().clone()
}

#[test]
fn remote_instructions_applied_before_local_files() {
    let (_root, mut engine) = engine(ScriptedRunner::default());
    let spec = JobSpec::new("ls").node("remote", Artifact::remote_folder("localhost", "/scratch/run"))
                                 .node("local", Artifact::single_file_named("from_remote.txt", "local wins"));
    let (_, record) = engine.run(spec).expect("job");
    assert_eq!(engine.transport().calls.borrow().as_slice(), ["copy localhost:/scratch/run"]);
    let workdir = record.working_dir.expect("working dir");
    let content = fs::read_to_string(Path::new(&workdir).join("from_remote.txt")).unwrap();
    assert_eq!(content, "local wins");
    assert_eq!(record.staged, vec!["from_remote.txt"]);
}

#[test]
fn parser_failure_records_job_failed() {
    let (_root, mut engine) = engine(ScriptedRunner::default());
    let parser = OutputParser::new(|_, _| Err("unexpected output".into()));
    let err = engine.run(JobSpec::new("tool").parser(parser)).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Parsing);
    let job_id = engine.event_store().job_ids()[0];
    let record = engine.record(job_id);
    let failure = record.failure.expect("failure");
    assert_eq!(failure.state, JobState::Executed);
    assert_eq!(failure.class, ErrorClass::Parsing);
}

#[test]
fn parser_outputs_are_merged() {
    let runner = ScriptedRunner { stdout: "a b c\n".into(),
                                  ..Default::default() };
    let (_root, mut engine) = engine(runner);
    let parser = OutputParser::new(|dir, _| {
        let words = fs::read_to_string(dir.join("stdout"))?.split_whitespace().count();
        Ok(IndexMap::from([("words".to_string(), Artifact::scalar(words as i64))]))
    });
    let (artifacts, record) = engine.run(JobSpec::new("tool").parser(parser)).expect("job");
    assert_eq!(artifacts["words"].as_scalar(), Some(&3i64.into()));
    assert!(record.outputs.contains_key("words"));
}

#[test]
fn fingerprint_is_deterministic_across_runs() {
    let fp = |engine: &mut ShellEngine<_, ScriptedRunner, RecordingTransport>| {
        let spec = JobSpec::new("tool").node("n", Artifact::scalar(1)).output("extra.txt");
        engine.run(spec).expect("job").1.fingerprint.expect("fingerprint")
    };
    let runner = || ScriptedRunner { extra: vec![("extra.txt".into(), "x".into())],
                                     ..Default::default() };
    let (_r1, mut e1) = engine(runner());
    let (_r2, mut e2) = engine(runner());
    assert_eq!(fp(&mut e1), fp(&mut e2));
}

#[test]
fn submit_then_run_from_queue() {
    let (_root, mut engine) = engine(ScriptedRunner::default());
    let mut queue = VecQueue::default();
    let record = engine.submit(JobSpec::new("tool"), &mut queue).expect("submit");
    assert_eq!(record.state, Some(JobState::Created));
    assert_eq!(queue.0.len(), 1);

    let (job_id, spec) = queue.0.remove(0);
    assert_eq!(job_id, record.job_id);
    let (_, done) = engine.run_with_id(job_id, spec.clone()).expect("run");
    assert_eq!(done.state, Some(JobState::Finalized));
    let created = engine.events_for(job_id)
                        .iter()
                        .filter(|e| matches!(e.kind, JobEventKind::JobCreated { .. }))
                        .count();
    assert_eq!(created, 1);
    assert!(engine.run_with_id(job_id, spec).is_err());
}
