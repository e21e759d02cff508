use anyhow::{Result, anyhow};
use page_handler::{PrintCommandOutcome, WindowId};
use printer::{Destination, PrintConfig, PrintError, SURFACE_TAG};

mod common;

use common::{Harness, body_children, root_display, with_doc};

#[tokio::test(start_paused = true)]
async fn root_is_hidden_while_printing_and_restored_after() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(None)?);
    let main = harness.main_document();

    let ticket = harness.printer.print_content("Hello", None)?;
    assert_eq!(ticket.destination(), Destination::CurrentWindow);
    assert_eq!(ticket.window(), WindowId::MAIN);
    assert_eq!(root_display(&main)?, "none");
    assert!(harness.printer.is_session_active());

    let children = body_children(&main);
    assert_eq!(children.len(), 2);
    let surface = children[1];
    with_doc(&main, |doc| {
        assert_eq!(doc.tag_name(surface), Some(SURFACE_TAG));
        assert_eq!(doc.get_attribute(surface, "class"), Some("print-overlay"));
        assert_eq!(doc.text_content(surface), "Hello");
    });

    ticket.settled().await;
    assert_eq!(harness.host.print_command_calls(WindowId::MAIN), 1);
    assert!(harness.status.current());
    assert!(harness.host.opened_windows().is_empty());

    assert_eq!(harness.host.fire_after_print(WindowId::MAIN), 1);
    assert_eq!(root_display(&main)?, "");
    assert_eq!(body_children(&main).len(), 1);
    assert!(!harness.status.current());
    assert!(!harness.printer.is_session_active());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn prior_inline_display_is_restored() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(Some("block"))?);
    let main = harness.main_document();

    let ticket = harness.printer.print_content("Hello", None)?;
    assert_eq!(root_display(&main)?, "none");
    ticket.settled().await;
    harness.host.fire_after_print(WindowId::MAIN);
    assert_eq!(root_display(&main)?, "block");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn listener_is_armed_before_the_dialog_opens() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(None)?);
    let ticket = harness.printer.print_content("Hello", None)?;
    assert_eq!(harness.host.pending_listeners(WindowId::MAIN), 1);
    assert_eq!(harness.host.print_command_calls(WindowId::MAIN), 0);
    assert!(!harness.status.current());
    ticket.settled().await;
    assert_eq!(harness.host.pending_listeners(WindowId::MAIN), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn clean_up_is_idempotent() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(Some("flex"))?);
    let main = harness.main_document();
    let ticket = harness.printer.print_content("Hello", None)?;
    ticket.settled().await;

    assert!(harness.printer.clean_up(Destination::CurrentWindow, WindowId::MAIN));
    assert!(!harness.printer.clean_up(Destination::CurrentWindow, WindowId::MAIN));
    assert_eq!(root_display(&main)?, "flex");
    assert_eq!(body_children(&main).len(), 1);

    // The dialog closing afterwards finds nothing left to undo
    harness.host.fire_after_print(WindowId::MAIN);
    assert_eq!(root_display(&main)?, "flex");
    assert_eq!(body_children(&main).len(), 1);
    assert!(!harness.status.current());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn overlapping_prints_are_rejected() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(None)?);
    let main = harness.main_document();
    let first = harness.printer.print_content("First", None)?;

    let second = harness.printer.print_content("Second", None);
    assert!(matches!(second, Err(PrintError::SessionAlreadyActive)));
    assert_eq!(body_children(&main).len(), 2);

    first.settled().await;
    harness.host.fire_after_print(WindowId::MAIN);

    let third = harness.printer.print_content("Third", None)?;
    third.settled().await;
    let texts = with_doc(&main, |doc| {
        doc.query_selector_all(SURFACE_TAG)
            .into_iter()
            .map(|surface| doc.text_content(surface))
            .collect::<Vec<_>>()
    });
    assert_eq!(texts, ["Third"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn missing_root_still_prints() -> Result<()> {
    let config = PrintConfig::new(false, 200, "print-overlay", "main-shell");
    let harness = Harness::new(&config, common::app_document(None)?);
    let main = harness.main_document();

    let ticket = harness.printer.print_content("Hello", None)?;
    assert_eq!(root_display(&main)?, "");
    ticket.settled().await;
    assert_eq!(harness.host.print_command_calls(WindowId::MAIN), 1);

    harness.host.fire_after_print(WindowId::MAIN);
    assert_eq!(body_children(&main).len(), 1);
    assert!(!harness.status.current());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn element_is_wrapped_and_copied() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(None)?);
    let main = harness.main_document();
    let order = with_doc(&main, |doc| doc.query_selector("#order")).ok_or_else(|| anyhow!("no order"))?;

    let ticket = harness.printer.print_element(order)?;
    with_doc(&main, |doc| {
        let surfaces = doc.query_selector_all(SURFACE_TAG);
        assert_eq!(surfaces.len(), 1);
        let wrapped = doc.children(surfaces[0]);
        assert_eq!(wrapped.len(), 1);
        assert_ne!(wrapped[0], order);
        assert_eq!(doc.get_attribute(wrapped[0], "id"), Some("order"));
        assert!(doc.is_attached(order));
    });

    ticket.settled().await;
    harness.host.fire_after_print(WindowId::MAIN);
    with_doc(&main, |doc| {
        assert!(doc.query_selector_all(SURFACE_TAG).is_empty());
        assert_eq!(doc.text_content(order), "Order 1001");
    });
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn text_node_is_not_printable() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(None)?);
    let main = harness.main_document();
    let text = with_doc(&main, |doc| {
        doc.query_selector("#order")
            .and_then(|order| doc.children(order).first().copied())
    })
    .ok_or_else(|| anyhow!("no text"))?;

    let result = harness.printer.print_element(text);
    assert!(matches!(result, Err(PrintError::InvalidContentKind { .. })));
    assert!(!harness.printer.is_session_active());
    assert_eq!(root_display(&main)?, "");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn detached_element_survives_repeated_prints() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(None)?);
    let main = harness.main_document();
    let receipt = common::with_doc_mut(&main, |doc| -> Result<_> {
        let receipt = doc.create_element("article");
        let text = doc.create_text_node("Receipt 7");
        doc.append_child(receipt, text)?;
        Ok(receipt)
    })?;

    for _ in 0..2_u8 {
        let ticket = harness.printer.print_content(receipt, None)?;
        with_doc(&main, |doc| {
            assert!(doc.contains(receipt));
            assert_eq!(doc.parent(receipt), None);
            let surfaces = doc.query_selector_all(SURFACE_TAG);
            assert_eq!(surfaces.len(), 1);
            assert_eq!(doc.text_content(surfaces[0]), "Receipt 7");
        });
        assert!(ticket.settled().await);
        harness.host.fire_after_print(WindowId::MAIN);
    }
    with_doc(&main, |doc| assert_eq!(doc.text_content(receipt), "Receipt 7"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn completion_runs_after_the_printer_is_dropped() -> Result<()> {
    let Harness { host, printer, status } =
        Harness::new(&common::config(false), common::app_document(Some("block"))?);
    let main = host.main_document();

    let ticket = printer.print_content("Hello", None)?;
    assert!(ticket.settled().await);
    drop(printer);
    assert!(status.current());

    assert_eq!(host.fire_after_print(WindowId::MAIN), 1);
    assert_eq!(root_display(&main)?, "block");
    assert_eq!(body_children(&main).len(), 1);
    assert!(!status.current());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failing_print_command_falls_back_in_the_current_window() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(None)?);
    harness.host.set_print_command_outcome(PrintCommandOutcome::Rejected);

    let ticket = harness.printer.print_content("Hello", None)?;
    assert!(ticket.settled().await);
    assert_eq!(harness.host.print_command_calls(WindowId::MAIN), 1);
    assert_eq!(harness.host.window_print_calls(WindowId::MAIN), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn arming_twice_registers_one_listener() -> Result<()> {
    let harness = Harness::new(&common::config(false), common::app_document(None)?);
    let main = harness.main_document();
    let ticket = harness.printer.print_content("Hello", None)?;
    assert!(ticket.settled().await);

    assert!(!harness.printer.arm_completion(WindowId::MAIN, Destination::CurrentWindow));
    assert!(!harness.printer.arm_completion(WindowId::MAIN, Destination::CurrentWindow));
    assert_eq!(harness.host.pending_listeners(WindowId::MAIN), 1);

    assert_eq!(harness.host.fire_after_print(WindowId::MAIN), 1);
    assert_eq!(body_children(&main).len(), 1);
    assert_eq!(root_display(&main)?, "");
    assert!(!harness.status.current());
    assert_eq!(harness.host.fire_after_print(WindowId::MAIN), 0);

    // Once fired, the window can be armed again
    assert!(harness.printer.arm_completion(WindowId::MAIN, Destination::CurrentWindow));
    assert_eq!(harness.host.pending_listeners(WindowId::MAIN), 1);
    Ok(())
}
