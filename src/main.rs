//! Demo: divide un archivo de tres líneas con `split` y muestra los outputs
//! recolectados y el registro de ejecución.

use shellflow::shell_core::Artifact;
use shellflow::{init_dotenv, LaunchError, LaunchRequest, ShellLauncher, ShellflowConfig};

fn main() -> Result<(), LaunchError> {
    init_dotenv();
    let config = ShellflowConfig::from_env();
    println!("workdir: {}", config.workdir_root.display());

    let mut launcher = ShellLauncher::from_config(&config);
    let request = LaunchRequest::new("split").arguments("-l 1 {file}")
                                             .node("file", Artifact::single_file("line 0\nline 1\nline 2\n"))
                                             .output("x*");
    let (artifacts, record) = launcher.launch(request)?;

    for (label, artifact) in &artifacts {
        let text = artifact.text().unwrap_or_default();
        println!("{label:>8} [{}] {:?}", &artifact.hash()[..12], text);
    }
    match serde_json::to_string_pretty(&record) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("no se pudo serializar el registro: {e}"),
    }
    Ok(())
}
