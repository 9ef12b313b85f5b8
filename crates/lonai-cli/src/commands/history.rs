use color_eyre::eyre::{Result, WrapErr};
use lonai_core::ExportFormat;

use crate::app::Researcher;
use crate::cli::HistoryArgs;
use crate::output;

pub fn run(app: &Researcher, args: HistoryArgs) -> Result<()> {
    if let Some(id) = args.show {
        let record = app.get(&id)?;
        output::record(&record);
        return Ok(());
    }

    if let Some(id) = args.delete {
        app.delete(&id)?;
        output::success(&format!("Deleted research record {id}"));
        return Ok(());
    }

    if let Some(id) = args.export {
        let format: ExportFormat = match args.format {
            Some(name) => name.parse()?,
            None => app.default_format(),
        };
        let path = app
            .export_record(&id, format)
            .wrap_err_with(|| format!("Failed to export record {id}"))?;
        output::success(&format!("Report exported to: {}", path.display()));
        return Ok(());
    }

    if let Some(keyword) = args.search {
        output::header(&format!("Search Results: '{keyword}'"));
        let records = app.search_history(&keyword, args.limit, args.offset)?;
        output::history(&records, args.offset);
        return Ok(());
    }

    output::header("Research History");
    let records = app.history(args.limit, args.offset)?;
    output::history(&records, args.offset);

    Ok(())
}
