use dashboard_core::{ActivePanel, AppViewModel, ChainEntry, ChatRole, NoticeSeverity};

/// Render the whole view model to stdout. The shell redraws the full screen
/// state on every dirty frame; there is no partial repaint.
pub fn render(view: &AppViewModel) {
    println!();
    render_documents(view);
    render_panel(&view.active);
    if let Some(chain) = &view.sentence_chain {
        println!("-- sentence {} --", chain.sentence_hash);
        render_chain(&chain.stages);
        println!("   (type 'back' to close)");
    }
    if let Some(notice) = &view.notification {
        let tag = match notice.severity {
            NoticeSeverity::Info => "note",
            NoticeSeverity::Error => "error",
        };
        println!("[{tag}] {}: {}", notice.title, notice.body);
    }
}

fn render_documents(view: &AppViewModel) {
    if view.loading_documents {
        println!("documents (loading...)");
    } else {
        println!("documents");
    }
    if let Some(error) = &view.documents_error {
        println!("  ! {error}");
    }
    if view.documents.is_empty() {
        println!("  (none yet; 'upload <path>' to add one)");
        return;
    }
    for (index, row) in view.documents.iter().enumerate() {
        let marker = if row.active { ">" } else { " " };
        let pending = if row.provisional { "*" } else { " " };
        println!(
            "{marker}{pending}{:>3}  {:<30}  {}",
            index + 1,
            row.filename,
            row.status_label
        );
    }
}

fn render_panel(panel: &ActivePanel) {
    match panel {
        ActivePanel::Empty => {}
        ActivePanel::Uploading { filename } => {
            println!("-- {filename} --");
            println!("   uploading...");
        }
        ActivePanel::PendingTrigger { filename, .. } => {
            println!("-- {filename} --");
            println!("   uploaded but not processed; type 'retry' to start processing");
        }
        ActivePanel::Processing {
            filename,
            status_label,
            progress,
            chain,
            ..
        } => {
            println!("-- {filename}: {status_label} --");
            if let Some(percentage) = progress.percentage {
                println!("   {percentage}%{}", progress_detail(progress));
            }
            render_chain(chain);
        }
        ActivePanel::Failed {
            filename, message, ..
        } => {
            println!("-- {filename}: failed --");
            println!("   {message}");
        }
        ActivePanel::Chat {
            filename,
            messages,
            awaiting,
            disabled_reason,
            ..
        } => {
            println!("-- {filename}: chat --");
            for message in messages {
                let speaker = match message.role {
                    ChatRole::User => "you",
                    ChatRole::Assistant => "assistant",
                    ChatRole::Error => "error",
                    ChatRole::System => "system",
                };
                println!("   {speaker}: {}", message.content);
                for reference in &message.references {
                    println!("      [{}] {}", reference.sentence_hash, reference.sentence_text);
                }
            }
            if *awaiting {
                println!("   (waiting for an answer...)");
            }
            match disabled_reason {
                Some(reason) => println!("   {reason}"),
                None => println!("   (type 'ask <question>')"),
            }
        }
    }
}

fn progress_detail(progress: &dashboard_core::ProgressView) -> String {
    match (progress.completed_sentences, progress.total_sentences) {
        (Some(completed), Some(total)) => {
            let calls = progress
                .llm_calls_made
                .map(|calls| format!(", {calls} llm calls"))
                .unwrap_or_default();
            format!("  ({completed}/{total} sentences{calls})")
        }
        _ => String::new(),
    }
}

fn render_chain(entries: &[ChainEntry]) {
    for entry in entries {
        let status = entry.status.as_deref().unwrap_or("");
        let sentence = entry
            .sentence_number
            .map(|n| format!(" s{n}"))
            .unwrap_or_default();
        println!("   {} {}{sentence} {status}", entry.timestamp, entry.stage);
    }
}
