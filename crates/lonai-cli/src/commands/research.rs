use color_eyre::eyre::{bail, Result};
use lonai_core::ResearchRequest;

use crate::app::Researcher;
use crate::cli::ResearchArgs;
use crate::output;
use crate::progress::Spinner;

pub async fn run(app: &Researcher, args: ResearchArgs) -> Result<()> {
    let query = if args.query.is_empty() {
        match output::prompt("Enter your research question:")? {
            Some(query) => query,
            None => bail!("No research question given"),
        }
    } else {
        args.query.join(" ")
    };

    output::header("Research Assistant");
    output::info(&format!("Query: {}", query.trim()));

    let mut request = ResearchRequest::new(query).with_save(!args.no_save);
    if let Some(lang) = args.lang {
        request = request.with_language(lang);
    }
    if args.export {
        request = request.with_export(args.format);
    }

    let spinner = Spinner::start("Conducting research...");
    let result = app.research(request).await;
    spinner.finish();

    let outcome = result?;
    output::info(&format!("Language: {}", outcome.record.language));
    output::outcome(&outcome);

    Ok(())
}
