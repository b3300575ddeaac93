use crate::{utils, Feed, FeedConfig, FeedEntry, FeedError};
use quick_xml::{
    escape::{escape, partial_escape},
    events::{BytesDecl, BytesText, Event},
    Writer,
};
use std::io::Write;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> quick_xml::Result<()> {
    w.create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn write_entry<W: Write>(
    w: &mut Writer<W>,
    entry: &FeedEntry,
    config: &FeedConfig,
) -> quick_xml::Result<()> {
    let summary = format!(
        r#"<a href="{}">{}</a>"#,
        escape(&entry.url),
        escape(&config.summary_text)
    );

    w.create_element("entry").write_inner_content(|w| {
        text_element(w, "title", &entry.title)?;
        w.create_element("link")
            .with_attribute(("href", entry.url.as_str()))
            .write_empty()?;
        text_element(w, "id", &entry.id)?;
        text_element(w, "updated", &utils::format_timestamp(entry.updated))?;
        w.create_element("summary")
            .with_attribute(("type", "html"))
            .write_text_content(BytesText::from_escaped(partial_escape(&summary)))?;
        w.create_element("category")
            .with_attributes([
                ("term", entry.category.term.as_str()),
                ("label", entry.category.label.as_str()),
            ])
            .write_empty()?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

pub fn render(feed: &Feed, config: &FeedConfig) -> Result<Vec<u8>, FeedError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    if let Some(href) = &config.stylesheet {
        let pi = format!(r#"xml-stylesheet href="{}" type="text/xsl""#, escape(href));
        writer.write_event(Event::PI(BytesText::from_escaped(pi)))?;
    }

    writer
        .create_element("feed")
        .with_attribute(("xmlns", ATOM_NS))
        .write_inner_content(|w| {
            text_element(w, "title", &config.title)?;
            w.create_element("link")
                .with_attributes([("href", config.self_link.as_str()), ("rel", "self")])
                .write_empty()?;
            text_element(w, "updated", &utils::format_timestamp(feed.updated))?;
            text_element(w, "id", &config.id)?;
            w.create_element("author").write_inner_content(|w| {
                text_element(w, "name", &config.author_name)?;
                text_element(w, "uri", &config.author_uri)
            })?;
            text_element(w, "icon", &config.icon)?;
            w.create_element("generator")
                .with_attribute(("uri", config.generator_uri.as_str()))
                .write_text_content(BytesText::new(&config.generator))?;

            for entry in &feed.entries {
                write_entry(w, entry, config)?;
            }
            Ok::<(), quick_xml::Error>(())
        })?;

    let mut document = writer.into_inner();
    document.push(b'\n');
    Ok(document)
}
