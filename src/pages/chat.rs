use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::chat::{BrowserStorage, ChatError, ChatSession, ChatTransport, HttpTransport, Role};
use crate::components::research_graph::ResearchGraph;
use crate::config::ClientConfig;
use crate::graph::{GraphFilter, KindFilter, NodeId, NodeKind, SortBy};

type Session = StoredValue<ChatSession, LocalStorage>;

fn bump(version: RwSignal<u64>) {
	version.update(|v| *v += 1);
}

/// Chat with the research assistant next to the graph it builds.
#[component]
pub fn Chat() -> impl IntoView {
	let config = ClientConfig::default();
	info!("chat endpoint {}", config.chat_endpoint());
	let session: Session = StoredValue::new_local(ChatSession::restore(Box::new(
		BrowserStorage::new(config.storage_key.clone()),
	)));
	let transport = StoredValue::new_local(HttpTransport::new(&config));
	let version = RwSignal::new(0u64);
	let input = RwSignal::new(String::new());

	let send = move || {
		let text = input.get_untracked();
		match session.try_update_value(|s| s.begin_turn(&text)) {
			Some(Ok(pending)) => {
				input.set(String::new());
				bump(version);
				let transport = transport.get_value();
				spawn_local(async move {
					let result = transport.send(pending.request()).await;
					let outcome = session.try_update_value(|s| s.complete_turn(pending, result));
					if let Some(Err(e)) = outcome {
						warn!("message not delivered: {e}");
					}
					bump(version);
				});
			}
			Some(Err(ChatError::EmptyMessage)) | None => {}
			Some(Err(e)) => warn!("cannot send: {e}"),
		}
	};

	let on_select = move |id: NodeId| {
		if let Some(Some(prompt)) = session.try_update_value(|s| s.select_node(id.as_str())) {
			input.set(prompt);
		}
		bump(version);
	};

	view! {
		<div class="chat-layout">
			<Sidebar session version />
			<section class="chat-panel">
				<Messages session version />
				<SelectionHistory session version input />
				<form
					class="chat-input"
					on:submit=move |ev| {
						ev.prevent_default();
						send();
					}
				>
					<input
						type="text"
						placeholder="Ask about a research topic..."
						prop:value=move || input.get()
						on:input=move |ev| {
							input.set(event_target_value(&ev));
							let had_error = session
								.try_update_value(|s| {
									let had = s.last_error().is_some();
									s.clear_error();
									had
								})
								.unwrap_or(false);
							if had_error {
								bump(version);
							}
						}
					/>
					<button
						type="submit"
						disabled=move || {
							version.track();
							session.with_value(|s| s.is_busy())
						}
					>
						"Send"
					</button>
				</form>
			</section>
			<section class="graph-panel">
				<ResearchGraph session on_select config=config.layout.clone() />
				<NodeDetails session version />
				<PaperList session version />
			</section>
		</div>
	}
}

#[component]
fn Sidebar(session: Session, version: RwSignal<u64>) -> impl IntoView {
	let summaries = move || {
		version.track();
		session.with_value(|s| s.summaries())
	};

	view! {
		<aside class="sidebar">
			<button
				class="new-chat"
				on:click=move |_| {
					session.update_value(|s| s.new_chat());
					bump(version);
				}
			>
				"New chat"
			</button>
			<ul class="conversations">
				<For each=summaries key=|c| (c.id.clone(), c.preview.clone(), c.active) let:summary>
					{
						let (open_id, delete_id) = (summary.id.clone(), summary.id.clone());
						view! {
							<li class:active=summary.active>
								<span
									class="preview"
									on:click=move |_| {
										session.update_value(|s| {
											s.switch_to(&open_id);
										});
										bump(version);
									}
								>
									{summary.preview.clone()}
								</span>
								<button
									class="delete"
									title="Delete conversation"
									on:click=move |_| {
										session.update_value(|s| s.delete(&delete_id));
										bump(version);
									}
								>
									"×"
								</button>
							</li>
						}
					}
				</For>
			</ul>
		</aside>
	}
}

#[component]
fn Messages(session: Session, version: RwSignal<u64>) -> impl IntoView {
	let messages = move || {
		version.track();
		session.with_value(|s| s.messages().to_vec())
	};
	let busy = move || {
		version.track();
		session.with_value(|s| s.is_busy())
	};
	let error = move || {
		version.track();
		session.with_value(|s| s.last_error().map(str::to_owned))
	};

	view! {
		<div class="messages">
			<For each=messages key=|m| m.id.clone() let:message>
				<div class={match message.role {
					Role::User => "message user",
					Role::Assistant => "message assistant",
				}}>
					{message
						.selected_node
						.as_ref()
						.map(|n| view! { <span class="message-node">{n.title.clone()}</span> })}
					<p>{message.content.clone()}</p>
				</div>
			</For>
			<Show when=busy>
				<div class="message assistant pending">"Thinking..."</div>
			</Show>
			{move || error().map(|e| view! { <div class="chat-error">{e}</div> })}
		</div>
	}
}

#[component]
fn SelectionHistory(session: Session, version: RwSignal<u64>, input: RwSignal<String>) -> impl IntoView {
	let history = move || {
		version.track();
		session.with_value(|s| {
			s.selection()
				.history()
				.iter()
				.map(|n| (n.id.clone(), n.title.clone()))
				.collect::<Vec<_>>()
		})
	};

	view! {
		<div class="selection-history">
			<For each=history key=|(id, _)| id.clone() let:entry>
				{
					let (id, title) = entry;
					let forget_id = id.clone();
					view! {
						<span class="history-chip">
							<span on:click=move |_| {
								if let Some(Some(prompt)) = session
									.try_update_value(|s| s.select_node(id.as_str()))
								{
									input.set(prompt);
								}
								bump(version);
							}>{title}</span>
							<button on:click=move |_| {
								session.update_value(|s| s.forget_selection(forget_id.as_str()));
								bump(version);
							}>"×"</button>
						</span>
					}
				}
			</For>
		</div>
	}
}

#[component]
fn NodeDetails(session: Session, version: RwSignal<u64>) -> impl IntoView {
	let selected = move || {
		version.track();
		session.with_value(|s| s.selection().selected().cloned())
	};

	move || {
		selected().map(|node| {
			let id = node.id.clone();
			let paper = node.paper_details().cloned();
			view! {
				<div class="node-details">
					<h3>{node.title.clone()}</h3>
					{paper.map(|p| {
						view! {
							<p class="meta">
								{p.year.map(|y| format!("{y} · "))}
								{p.citations.map(|c| format!("{c} citations"))}
							</p>
							<p class="authors">{p.authors.join(", ")}</p>
							<p class="abstract">{p.abstract_text.unwrap_or_default()}</p>
						}
					})}
					<button on:click=move |_| {
						session.update_value(|s| s.edit_graph(|g| g.remove_node(id.as_str())));
						bump(version);
					}>"Remove from graph"</button>
					<button on:click=move |_| {
						session.update_value(|s| s.clear_selection());
						bump(version);
					}>"Close"</button>
				</div>
			}
		})
	}
}

#[component]
fn PaperList(session: Session, version: RwSignal<u64>) -> impl IntoView {
	let search = RwSignal::new(String::new());
	let sort_by = RwSignal::new(SortBy::Relevance);
	let papers = move || {
		version.track();
		let filter = GraphFilter {
			kind: KindFilter::Only(NodeKind::Paper),
			search: search.get(),
			sort_by: sort_by.get(),
			..GraphFilter::default()
		};
		session.with_value(|s| {
			filter
				.apply(s.graph().graph())
				.nodes
				.into_iter()
				.map(|n| (n.id.to_string(), n.title))
				.collect::<Vec<_>>()
		})
	};

	view! {
		<div class="paper-list">
			<input
				type="search"
				placeholder="Filter papers"
				prop:value=move || search.get()
				on:input=move |ev| search.set(event_target_value(&ev))
			/>
			<select on:change=move |ev| {
				sort_by
					.set(
						match event_target_value(&ev).as_str() {
							"citations" => SortBy::Citations,
							"year" => SortBy::Year,
							_ => SortBy::Relevance,
						},
					)
			}>
				<option value="relevance">"Relevance"</option>
				<option value="citations">"Citations"</option>
				<option value="year">"Year"</option>
			</select>
			<ul>
				<For each=papers key=|(id, _)| id.clone() let:paper>
					<li>{paper.1}</li>
				</For>
			</ul>
		</div>
	}
}
