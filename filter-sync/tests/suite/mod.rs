mod form_flow;
mod support;
mod sync_loop;
